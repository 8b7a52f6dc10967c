//! Shared utilities and common types for the Club Portal backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Contact info validation (phone numbers, email addresses)
//! - Verification code generation and expiry checks

pub mod validation;
pub mod verification;
