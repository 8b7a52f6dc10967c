//! Member entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the members table.
#[derive(Debug, Clone, FromRow)]
pub struct MemberEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fullname: String,
    pub email: String,
    pub email_verified: bool,
    pub email_verification_code: Option<String>,
    pub email_verification_sent_at: Option<DateTime<Utc>>,
    pub phone_number: String,
    pub phone_verified: bool,
    pub phone_verification_code: Option<String>,
    pub phone_verification_sent_at: Option<DateTime<Utc>>,
    pub membercard_number: String,
    pub signup_bias: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Brief member row for embedding in joined queries.
#[derive(Debug, Clone, FromRow)]
pub struct MemberBriefEntity {
    pub id: Uuid,
    pub fullname: String,
}

/// One assignment row feeding the eligibility evaluator: the activity's
/// weight, its event year, and whether a pending delist request exists.
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRowEntity {
    pub activity_id: Uuid,
    pub event_id: Uuid,
    pub event_year: i32,
    pub weight: f64,
    pub completed: Option<bool>,
    pub pending_delist: bool,
}
