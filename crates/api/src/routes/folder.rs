//! Route definitions for folders.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{export, folder};
use crate::state::AppState;

/// Folder routes.
///
/// ```text
/// POST   /folder                -> create
/// GET    /folder/delete/{id}    -> delete
/// DELETE /folders/{id}          -> delete
/// GET    /folder/pdf/{id}       -> folder_pdfs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/folder", post(folder::create))
        .route("/folder/delete/{id}", get(folder::delete))
        .route("/folders/{id}", delete(folder::delete))
        .route("/folder/pdf/{id}", get(export::folder_pdfs))
}
