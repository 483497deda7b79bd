//! Handlers for folders.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use campo_core::error::CoreError;
use campo_core::types::DbId;
use campo_db::models::folder::{CreateFolder, Folder};
use campo_db::repositories::FolderRepo;

use crate::error::{AppError, AppResult};
use crate::response::MutationResponse;
use crate::state::AppState;

/// POST /api/folder
///
/// Accepts a multipart form with a required `folder_name` field.
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<MutationResponse<Folder>>)> {
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("folder_name") {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            name = Some(text);
        }
    }

    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing required 'folder_name' field".into()))?;

    if FolderRepo::find_by_name(&state.pool, &name).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A folder named '{name}' already exists"
        ))));
    }

    let folder = FolderRepo::create(&state.pool, &CreateFolder { name }).await?;
    tracing::info!(folder_id = folder.id, name = %folder.name, "Folder created");

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::ok("Folder created", folder)),
    ))
}

/// GET /api/folder/delete/{id} and DELETE /api/folders/{id}
///
/// Removes the folder together with every inspection in it, then deletes
/// the photos those inspections referenced.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MutationResponse<Folder>>> {
    let deleted = FolderRepo::delete_with_inspections(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id,
        }))?;

    tracing::info!(
        folder_id = id,
        inspections = deleted.inspections.len(),
        "Folder deleted with its inspections"
    );

    // Collect before awaiting: a borrowed iterator here breaks the `Handler` bound.
    let photos: Vec<&str> = deleted
        .inspections
        .iter()
        .flat_map(|i| i.photo_paths())
        .collect();
    state.storage.remove_all(photos).await;

    Ok(Json(MutationResponse::ok(
        "Folder and all its inspections deleted",
        deleted.folder,
    )))
}
