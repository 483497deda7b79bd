//! Route definitions for inspections.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{export, inspection};
use crate::state::AppState;

/// Inspection routes.
///
/// ```text
/// POST   /add                       -> create
/// GET    /delete/{id}               -> delete
/// DELETE /inspections/{id}          -> delete
/// GET    /inspection/{id}           -> get_by_id
/// GET    /inspection/pdf/{id}       -> inspection_pdf
/// GET    /inspection/photos/{id}    -> inspection_photos
/// GET    /inspection/csv/{id}       -> inspection_csv_export
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(inspection::create))
        .route("/delete/{id}", get(inspection::delete))
        .route("/inspections/{id}", delete(inspection::delete))
        .route("/inspection/{id}", get(inspection::get_by_id))
        .route("/inspection/pdf/{id}", get(export::inspection_pdf))
        .route("/inspection/photos/{id}", get(export::inspection_photos))
        .route("/inspection/csv/{id}", get(export::inspection_csv_export))
}
