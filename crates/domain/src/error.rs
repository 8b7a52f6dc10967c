//! Domain error taxonomy.
//!
//! All booking engine operations surface failures through [`DomainError`].
//! Rule and authorization errors must reach the caller; only notification
//! delivery failures are swallowed (after logging) by the dispatch layer.

use thiserror::Error;

/// Errors raised at the booking engine boundary.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A business rule was broken: booking window closed, quota would be
    /// violated, slot already taken, duplicate delist request.
    #[error("Rule violation: {0}")]
    RuleViolation(String),

    /// The referenced member, activity, or delist request does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller lacks permission for the mutation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A delist request can be resolved exactly once.
    #[error("Delist request is already resolved")]
    AlreadyResolved,

    /// Malformed input that never reached a rule check.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl DomainError {
    /// Shorthand for a rule violation with a formatted reason.
    pub fn rule(reason: impl Into<String>) -> Self {
        DomainError::RuleViolation(reason.into())
    }
}
