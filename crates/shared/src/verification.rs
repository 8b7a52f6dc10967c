//! Verification code generation for phone and email ownership checks.
//!
//! A member proves ownership of a phone number or email address by echoing
//! back a short numeric code sent over that channel. Codes expire after a
//! fixed window; confirmation compares the stored code and its sent-at
//! timestamp against the submitted value.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Number of digits in a verification code.
pub const CODE_DIGITS: u32 = 6;

/// How long a verification code stays valid.
pub const CODE_VALIDITY_MINUTES: i64 = 15;

/// Generates a new zero-padded numeric verification code.
pub fn generate_code() -> String {
    let max = 10u32.pow(CODE_DIGITS);
    let code = rand::thread_rng().gen_range(0..max);
    format!("{:0width$}", code, width = CODE_DIGITS as usize)
}

/// Outcome of checking a submitted code against the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Valid,
    Mismatch,
    Expired,
    /// No code was ever issued for this channel.
    NotIssued,
}

/// Checks a submitted verification code.
pub fn check_code(
    stored: Option<&str>,
    sent_at: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> CodeCheck {
    let (stored, sent_at) = match (stored, sent_at) {
        (Some(s), Some(t)) if !s.is_empty() => (s, t),
        _ => return CodeCheck::NotIssued,
    };

    if now - sent_at > Duration::minutes(CODE_VALIDITY_MINUTES) {
        return CodeCheck::Expired;
    }

    if stored == submitted.trim() {
        CodeCheck::Valid
    } else {
        CodeCheck::Mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_DIGITS as usize);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_check_code_valid() {
        let now = Utc::now();
        let sent = now - Duration::minutes(5);
        assert_eq!(
            check_code(Some("123456"), Some(sent), "123456", now),
            CodeCheck::Valid
        );
        // Submitted codes are trimmed
        assert_eq!(
            check_code(Some("123456"), Some(sent), " 123456 ", now),
            CodeCheck::Valid
        );
    }

    #[test]
    fn test_check_code_mismatch() {
        let now = Utc::now();
        let sent = now - Duration::minutes(5);
        assert_eq!(
            check_code(Some("123456"), Some(sent), "654321", now),
            CodeCheck::Mismatch
        );
    }

    #[test]
    fn test_check_code_expired() {
        let now = Utc::now();
        let sent = now - Duration::minutes(CODE_VALIDITY_MINUTES + 1);
        assert_eq!(
            check_code(Some("123456"), Some(sent), "123456", now),
            CodeCheck::Expired
        );
    }

    #[test]
    fn test_check_code_not_issued() {
        let now = Utc::now();
        assert_eq!(check_code(None, None, "123456", now), CodeCheck::NotIssued);
        assert_eq!(
            check_code(Some(""), Some(now), "123456", now),
            CodeCheck::NotIssued
        );
    }
}
