//! Activity entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the activities table.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub type_id: Option<Uuid>,
    pub name: String,
    pub comment: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub weight: f64,
    pub assigned_member_id: Option<Uuid>,
    pub assigned_for_proxy_id: Option<Uuid>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub confirmed: bool,
    pub completed: Option<bool>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled: bool,
    pub earliest_bookable_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Activity row joined with names for listings.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityWithDetailsEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub comment: String,
    pub type_id: Option<Uuid>,
    pub type_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub weight: f64,
    pub assigned_member_id: Option<Uuid>,
    pub assigned_fullname: Option<String>,
    pub assigned_for_proxy_id: Option<Uuid>,
    pub proxy_fullname: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub confirmed: bool,
    pub completed: Option<bool>,
    pub cancelled: bool,
    pub earliest_bookable_date: Option<NaiveDate>,
    pub delist_requested: bool,
}

/// Activity row with the booking-relevant event fields and holder name,
/// fed into the booking planner.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityForBookingEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub weight: f64,
    pub cancelled: bool,
    pub earliest_bookable_date: Option<NaiveDate>,
    pub assigned_member_id: Option<Uuid>,
    pub assigned_fullname: Option<String>,
    pub event_start_date: NaiveDate,
    pub event_end_date: NaiveDate,
    pub event_cancelled: bool,
    pub has_pending_delist: bool,
}
