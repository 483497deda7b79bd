//! Request handlers.
//!
//! Handlers delegate persistence to the repositories in `campo_db`, file
//! handling to [`crate::storage`], and map errors via
//! [`AppError`](crate::error::AppError).

pub mod dashboard;
pub mod export;
pub mod folder;
pub mod inspection;
