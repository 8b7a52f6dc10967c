//! Member domain models and profile DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Brief member info embedded in other responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberBrief {
    pub id: Uuid,
    pub fullname: String,
}

/// Full member profile, returned to the member themselves and to staff.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fullname: String,
    pub email: String,
    pub email_verified: bool,
    pub phone_number: String,
    pub phone_verified: bool,
    pub membercard_number: String,
    pub signup_bias: i32,
    /// Members this member may book activities for.
    pub proxies: Vec<MemberBrief>,
    pub created_at: DateTime<Utc>,
}

/// Staff body for registering a new member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterMemberRequest {
    pub user_id: Uuid,

    #[validate(custom(function = "shared::validation::validate_fullname"))]
    pub fullname: String,

    #[validate(custom(function = "shared::validation::validate_email"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone_number: String,
}

/// Self-service / staff profile update. Absent fields are untouched.
///
/// Changing `phone_number` or `email` resets the matching verified flag;
/// `membercard_number` is staff-only.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateMemberRequest {
    #[validate(custom(function = "shared::validation::validate_fullname"))]
    pub fullname: Option<String>,

    #[validate(custom(function = "shared::validation::validate_email"))]
    pub email: Option<String>,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone_number: Option<String>,

    #[validate(custom(function = "shared::validation::validate_membercard_number"))]
    pub membercard_number: Option<String>,

    pub signup_bias: Option<i32>,
}

impl UpdateMemberRequest {
    /// True when no field is present; the PATCH is then a 400, not a no-op.
    pub fn is_empty(&self) -> bool {
        self.fullname.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.membercard_number.is_none()
            && self.signup_bias.is_none()
    }
}

/// Contact channel subject to verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationChannel {
    Phone,
    Email,
}

impl std::fmt::Display for VerificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationChannel::Phone => write!(f, "phone"),
            VerificationChannel::Email => write!(f, "email"),
        }
    }
}

/// Body for confirming a verification code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfirmVerificationRequest {
    pub code: String,
}

/// Response after requesting or confirming verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VerificationStatusResponse {
    pub channel: VerificationChannel,
    pub verified: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_member_request_empty() {
        let req: UpdateMemberRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());

        let req: UpdateMemberRequest =
            serde_json::from_str(r#"{"phone_number":"+46701234567"}"#).unwrap();
        assert!(!req.is_empty());
    }

    #[test]
    fn test_update_member_request_validation() {
        use validator::Validate;

        let req: UpdateMemberRequest =
            serde_json::from_str(r#"{"email":"not-an-email"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateMemberRequest =
            serde_json::from_str(r#"{"email":"member@example.com","phone_number":"070-123 45 67"}"#)
                .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_verification_channel_display() {
        assert_eq!(VerificationChannel::Phone.to_string(), "phone");
        assert_eq!(VerificationChannel::Email.to_string(), "email");
    }
}
