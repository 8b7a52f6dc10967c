//! HTTP route handlers, one module per resource.

pub mod activities;
pub mod delist_requests;
pub mod events;
pub mod health;
pub mod members;
pub mod reports;
