use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::UploadStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: campo_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Local directory holding uploaded photos.
    pub storage: Arc<UploadStorage>,
}
