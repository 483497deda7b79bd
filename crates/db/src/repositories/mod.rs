//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod folder_repo;
pub mod inspection_repo;

pub use folder_repo::FolderRepo;
pub use inspection_repo::InspectionRepo;
