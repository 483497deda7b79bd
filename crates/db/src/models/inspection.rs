//! Inspection entity model and DTOs.

use campo_core::export::InspectionDocument;
use campo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// An inspection row from the `inspections` table.
///
/// Photo fields are relative paths under `static/uploads/`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Inspection {
    pub id: DbId,
    pub folder_id: DbId,
    pub name: String,
    pub dimensions_value: Option<String>,
    pub dimensions_unit: Option<String>,
    pub observations: Option<String>,
    pub jusante_photo: String,
    pub montante_photo: String,
    pub other_photos: Json<Vec<String>>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub created_at: Timestamp,
}

impl Inspection {
    /// Every stored photo path: jusante, montante, then extras.
    pub fn photo_paths(&self) -> impl Iterator<Item = &str> {
        [self.jusante_photo.as_str(), self.montante_photo.as_str()]
            .into_iter()
            .chain(self.other_photos.0.iter().map(String::as_str))
    }
}

/// An inspection joined with its folder's name.
///
/// `folder_name` comes from a `LEFT JOIN` on `folders`, hence the `Option`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InspectionSummary {
    pub id: DbId,
    pub folder_id: DbId,
    pub folder_name: Option<String>,
    pub name: String,
    pub dimensions_value: Option<String>,
    pub dimensions_unit: Option<String>,
    pub observations: Option<String>,
    pub jusante_photo: String,
    pub montante_photo: String,
    pub other_photos: Json<Vec<String>>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub created_at: Timestamp,
}

impl From<InspectionSummary> for InspectionDocument {
    fn from(row: InspectionSummary) -> Self {
        Self {
            id: row.id,
            name: row.name,
            folder_name: row.folder_name,
            dimensions_value: row.dimensions_value,
            dimensions_unit: row.dimensions_unit,
            observations: row.observations,
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
            jusante_photo: row.jusante_photo,
            montante_photo: row.montante_photo,
            other_photos: row.other_photos.0,
        }
    }
}

/// DTO for creating a new inspection.
///
/// Built by the upload handler after the photos are stored; coordinates
/// come from EXIF and are `None` when no photo carried GPS data.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInspection {
    pub folder_id: DbId,
    pub name: String,
    pub dimensions_value: Option<String>,
    pub dimensions_unit: Option<String>,
    pub observations: Option<String>,
    pub jusante_photo: String,
    pub montante_photo: String,
    pub other_photos: Vec<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}
