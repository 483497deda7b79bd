//! Handlers for inspections: multipart create, detail, delete.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use campo_core::error::CoreError;
use campo_core::geo::first_coordinates;
use campo_core::types::DbId;
use campo_core::uploads::detect_photo_format;
use campo_db::models::inspection::{CreateInspection, Inspection, InspectionSummary};
use campo_db::repositories::{FolderRepo, InspectionRepo};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, MutationResponse};
use crate::state::AppState;

/// One uploaded file part.
#[derive(Debug)]
struct UploadedPhoto {
    file_name: String,
    bytes: Bytes,
}

/// Raw create-inspection form as received, before validation.
#[derive(Debug, Default)]
struct InspectionForm {
    folder_id: Option<String>,
    name: Option<String>,
    dim_value: Option<String>,
    dim_unit: Option<String>,
    obs: Option<String>,
    jusante: Option<UploadedPhoto>,
    montante: Option<UploadedPhoto>,
    others: Vec<UploadedPhoto>,
}

/// Read every multipart part into an [`InspectionForm`].
///
/// File parts with no filename and no content (what browsers send for an
/// untouched file input) are treated as absent.
async fn read_form(mut multipart: Multipart) -> AppResult<InspectionForm> {
    let mut form = InspectionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "foto_jusante" | "jusante" | "foto_montante" | "montante" | "outras_fotos"
            | "others" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if file_name.is_empty() && matches!(name.as_str(), "outras_fotos" | "others") {
                    continue;
                }
                let photo = UploadedPhoto { file_name, bytes };
                match name.as_str() {
                    "foto_jusante" | "jusante" => form.jusante = Some(photo),
                    "foto_montante" | "montante" => form.montante = Some(photo),
                    _ => form.others.push(photo),
                }
            }
            "folder_id" | "name" | "dim_value" | "dim_unit" | "obs" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let slot = match name.as_str() {
                    "folder_id" => &mut form.folder_id,
                    "name" => &mut form.name,
                    "dim_value" => &mut form.dim_value,
                    "dim_unit" => &mut form.dim_unit,
                    _ => &mut form.obs,
                };
                *slot = Some(text);
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(form)
}

/// Trim a text field; blank becomes `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_photo(photo: Option<UploadedPhoto>, field: &str) -> AppResult<UploadedPhoto> {
    match photo {
        Some(p) if !p.bytes.is_empty() => Ok(p),
        _ => Err(AppError::BadRequest(format!(
            "Missing required photo '{field}'"
        ))),
    }
}

/// POST /api/add
///
/// Accepts a multipart form with `folder_id`, `name`, optional `dim_value`,
/// `dim_unit` and `obs`, the required `foto_jusante` and `foto_montante`
/// files, and any number of `outras_fotos` files.
///
/// Photos are stored, then GPS coordinates are read from the first photo
/// that has them (jusante, montante, extras in order).
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<MutationResponse<Inspection>>)> {
    let form = read_form(multipart).await?;

    let folder_id: DbId = non_blank(form.folder_id)
        .ok_or_else(|| AppError::BadRequest("Missing required 'folder_id' field".into()))?
        .parse()
        .map_err(|_| AppError::BadRequest("'folder_id' must be an integer".into()))?;
    let name = non_blank(form.name)
        .ok_or_else(|| AppError::BadRequest("Missing required 'name' field".into()))?;
    let jusante = require_photo(form.jusante, "foto_jusante")?;
    let montante = require_photo(form.montante, "foto_montante")?;
    let others = form.others;

    // Reject bad content before anything is written.
    for photo in [&jusante, &montante].into_iter().chain(others.iter()) {
        detect_photo_format(&photo.bytes).map_err(|e| match e {
            CoreError::Validation(msg) => {
                AppError::BadRequest(format!("{}: {msg}", photo.file_name))
            }
            other => AppError::Core(other),
        })?;
    }

    FolderRepo::find_by_id(&state.pool, folder_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id: folder_id,
        }))?;

    let mut saved: Vec<String> = Vec::with_capacity(2 + others.len());
    let store_result = async {
        for photo in [&jusante, &montante].into_iter().chain(others.iter()) {
            let path = state
                .storage
                .save_photo(&photo.file_name, &photo.bytes)
                .await?;
            saved.push(path);
        }
        Ok::<(), AppError>(())
    }
    .await;
    if let Err(e) = store_result {
        state.storage.remove_all(saved.iter().map(String::as_str)).await;
        return Err(e);
    }

    let photo_bytes: Vec<Bytes> = [&jusante, &montante]
        .into_iter()
        .chain(others.iter())
        .map(|p| p.bytes.clone())
        .collect();
    let coordinates = tokio::task::spawn_blocking(move || {
        first_coordinates(photo_bytes.iter().map(|b| &b[..]))
    })
    .await
    .map_err(|e| AppError::InternalError(format!("EXIF task failed: {e}")))?;

    match &coordinates {
        Some(c) => tracing::debug!(lat = c.latitude, lon = c.longitude, "Geotagged inspection"),
        None => tracing::debug!("No GPS metadata in uploaded photos"),
    }

    let mut paths = saved.clone().into_iter();
    let input = CreateInspection {
        folder_id,
        name,
        dimensions_value: non_blank(form.dim_value),
        dimensions_unit: non_blank(form.dim_unit),
        observations: non_blank(form.obs),
        jusante_photo: paths.next().unwrap_or_default(),
        montante_photo: paths.next().unwrap_or_default(),
        other_photos: paths.collect(),
        latitude: coordinates.map(|c| c.latitude_string()),
        longitude: coordinates.map(|c| c.longitude_string()),
    };

    let inspection = match InspectionRepo::create(&state.pool, &input).await {
        Ok(inspection) => inspection,
        Err(e) => {
            state.storage.remove_all(saved.iter().map(String::as_str)).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        inspection_id = inspection.id,
        folder_id,
        photos = saved.len(),
        geotagged = inspection.latitude.is_some(),
        "Inspection created"
    );

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::ok("Inspection saved", inspection)),
    ))
}

/// GET /api/inspection/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InspectionSummary>>> {
    let inspection = InspectionRepo::find_summary(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Inspection",
            id,
        }))?;
    Ok(Json(DataResponse { data: inspection }))
}

/// GET /api/delete/{id} and DELETE /api/inspections/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MutationResponse<Inspection>>> {
    let inspection = InspectionRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Inspection",
            id,
        }))?;

    tracing::info!(inspection_id = id, "Inspection deleted");
    state.storage.remove_all(inspection.photo_paths()).await;

    Ok(Json(MutationResponse::ok("Inspection deleted", inspection)))
}
