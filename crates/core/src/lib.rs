//! Campo Manager domain logic.
//!
//! Everything here is free of HTTP and database concerns so it can be unit
//! tested directly and shared by the `campo-db` and `campo-api` crates.

pub mod error;
pub mod export;
pub mod geo;
pub mod report;
pub mod types;
pub mod uploads;
