//! Domain layer for the Club Portal backend.
//!
//! This crate contains:
//! - Domain models and per-endpoint DTOs (Member, Event, Activity, delist requests)
//! - The eligibility evaluator and the booking decision state machine
//! - The notification dispatcher interface
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
