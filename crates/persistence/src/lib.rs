//! Persistence layer for the Club Portal backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - SQL migrations (run at startup by the API binary)

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
