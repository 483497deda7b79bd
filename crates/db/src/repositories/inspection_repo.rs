//! Repository for the `inspections` table.

use campo_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::inspection::{CreateInspection, Inspection, InspectionSummary};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, folder_id, name, dimensions_value, dimensions_unit, \
    observations, jusante_photo, montante_photo, other_photos, latitude, longitude, created_at";

/// Inspection columns qualified with `i.` plus the joined folder name.
const SUMMARY_COLUMNS: &str = "i.id, i.folder_id, f.name AS folder_name, i.name, \
    i.dimensions_value, i.dimensions_unit, i.observations, i.jusante_photo, i.montante_photo, \
    i.other_photos, i.latitude, i.longitude, i.created_at";

/// Provides create/read/delete operations for inspections.
///
/// Inspections are never updated after insert.
pub struct InspectionRepo;

impl InspectionRepo {
    /// Insert a new inspection, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInspection,
    ) -> Result<Inspection, sqlx::Error> {
        let query = format!(
            "INSERT INTO inspections
                (folder_id, name, dimensions_value, dimensions_unit, observations,
                 jusante_photo, montante_photo, other_photos, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Inspection>(&query)
            .bind(input.folder_id)
            .bind(&input.name)
            .bind(&input.dimensions_value)
            .bind(&input.dimensions_unit)
            .bind(&input.observations)
            .bind(&input.jusante_photo)
            .bind(&input.montante_photo)
            .bind(Json(input.other_photos.clone()))
            .bind(&input.latitude)
            .bind(&input.longitude)
            .fetch_one(pool)
            .await
    }

    /// Find an inspection by ID, joined with its folder name.
    pub async fn find_summary(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InspectionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM inspections i
             LEFT JOIN folders f ON f.id = i.folder_id
             WHERE i.id = $1"
        );
        sqlx::query_as::<_, InspectionSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every inspection with its folder name, newest first.
    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<InspectionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM inspections i
             LEFT JOIN folders f ON f.id = i.folder_id
             ORDER BY i.created_at DESC, i.id DESC"
        );
        sqlx::query_as::<_, InspectionSummary>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the inspections of one folder, oldest first.
    pub async fn list_summaries_by_folder(
        pool: &PgPool,
        folder_id: DbId,
    ) -> Result<Vec<InspectionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM inspections i
             LEFT JOIN folders f ON f.id = i.folder_id
             WHERE i.folder_id = $1
             ORDER BY i.created_at, i.id"
        );
        sqlx::query_as::<_, InspectionSummary>(&query)
            .bind(folder_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an inspection by ID, returning the removed row.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Inspection>, sqlx::Error> {
        let query = format!("DELETE FROM inspections WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Inspection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
