//! Common validation utilities for member contact info.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum length for a member's full name.
pub const MAX_FULLNAME_LENGTH: usize = 120;

/// Maximum length for a membercard number.
pub const MAX_MEMBERCARD_LENGTH: usize = 20;

lazy_static! {
    /// Phone numbers are stored in E.164-like form: optional leading '+',
    /// then 7-15 digits. Spaces and dashes are stripped before matching.
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap();

    /// Deliberately loose email check; the verification code round-trip is
    /// the real proof of ownership.
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Normalizes a phone number by stripping spaces and dashes.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !matches!(c, ' ' | '-')).collect()
}

/// Validates a phone number after normalization.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let normalized = normalize_phone(phone);
    if PHONE_RE.is_match(&normalized) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone number must be 7-15 digits, optionally prefixed with +".into());
        Err(err)
    }
}

/// Validates an email address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email address".into());
        Err(err)
    }
}

/// Validates a member's full name.
pub fn validate_fullname(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_FULLNAME_LENGTH {
        let mut err = ValidationError::new("fullname_length");
        err.message = Some(
            format!(
                "Full name must be between 1 and {} characters",
                MAX_FULLNAME_LENGTH
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Validates a membercard number. Empty means "not issued" and is allowed.
pub fn validate_membercard_number(card: &str) -> Result<(), ValidationError> {
    if card.len() > MAX_MEMBERCARD_LENGTH {
        let mut err = ValidationError::new("membercard_length");
        err.message = Some(
            format!(
                "Membercard number must be at most {} characters",
                MAX_MEMBERCARD_LENGTH
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}
