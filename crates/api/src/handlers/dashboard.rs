//! Handler for the dashboard listing.

use axum::extract::State;
use axum::Json;
use campo_db::models::folder::Folder;
use campo_db::models::inspection::InspectionSummary;
use campo_db::repositories::{FolderRepo, InspectionRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Everything the landing screen shows.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub folders: Vec<Folder>,
    /// Newest first, each with its folder name.
    pub inspections: Vec<InspectionSummary>,
}

/// GET /api/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    let folders = FolderRepo::list(&state.pool).await?;
    let inspections = InspectionRepo::list_summaries(&state.pool).await?;
    Ok(Json(DashboardResponse {
        folders,
        inspections,
    }))
}
