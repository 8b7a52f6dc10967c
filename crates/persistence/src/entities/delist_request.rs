//! Delist request entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the activity_delist_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct DelistRequestEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub activity_id: Uuid,
    pub reason: String,
    pub approved: Option<bool>,
    pub approved_by: Option<Uuid>,
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Delist request joined with member, activity and event details.
#[derive(Debug, Clone, FromRow)]
pub struct DelistRequestWithDetailsEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_fullname: String,
    pub activity_id: Uuid,
    pub activity_name: String,
    pub event_id: Uuid,
    pub event_name: String,
    pub reason: String,
    pub approved: Option<bool>,
    pub approved_by: Option<Uuid>,
    pub approver_fullname: Option<String>,
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
