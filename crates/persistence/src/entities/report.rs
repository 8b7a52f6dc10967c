//! Reporting query row mappings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One implicated (member, event, activity) triple in the double-booking
/// report.
#[derive(Debug, Clone, FromRow)]
pub struct DoubleBookingRowEntity {
    pub member_id: Uuid,
    pub member_fullname: String,
    pub event_id: Uuid,
    pub event_name: String,
    pub activity_id: Uuid,
    pub activity_name: String,
    pub activity_comment: String,
}

/// One activity awaiting a completion decision.
#[derive(Debug, Clone, FromRow)]
pub struct CompletionRowEntity {
    pub activity_id: Uuid,
    pub activity_name: String,
    pub event_id: Uuid,
    pub event_name: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub assigned_member_id: Uuid,
    pub assigned_fullname: String,
    pub confirmed: bool,
    pub completed: Option<bool>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Member row for the readiness reports, with the aggregated booked weight
/// (pending delists excluded, signup bias applied).
#[derive(Debug, Clone, FromRow)]
pub struct MemberReadinessRowEntity {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub email_verified: bool,
    pub phone_number: String,
    pub phone_verified: bool,
    pub membercard_number: String,
    pub booked_weight: f64,
}

/// Next-day assigned activity with its recipient, for the reminder job.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderRowEntity {
    pub activity_id: Uuid,
    pub activity_name: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub member_id: Option<Uuid>,
    pub member_fullname: Option<String>,
    pub member_email: Option<String>,
    pub member_phone: Option<String>,
}
