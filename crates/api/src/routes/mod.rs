pub mod dashboard;
pub mod folder;
pub mod health;
pub mod inspection;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Paths keep the shapes the web and mobile clients already call, so the
/// resource routers are merged rather than nested.
///
/// ```text
/// GET    /dashboard                   folders + inspections
///
/// POST   /folder                      create folder (multipart)
/// GET    /folder/delete/{id}          delete folder and its inspections
/// DELETE /folders/{id}                same, REST verb
/// GET    /folder/pdf/{id}             ZIP of PDF reports
///
/// POST   /add                         create inspection (multipart)
/// GET    /delete/{id}                 delete inspection
/// DELETE /inspections/{id}            same, REST verb
/// GET    /inspection/{id}             inspection detail
/// GET    /inspection/pdf/{id}         PDF report
/// GET    /inspection/photos/{id}      ZIP of photos
/// GET    /inspection/csv/{id}         CSV export
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(dashboard::router())
        .merge(folder::router())
        .merge(inspection::router())
}
