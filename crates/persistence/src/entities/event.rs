//! Event entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub comment: String,
    pub type_id: Option<Uuid>,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row mapping for the event_types table.
#[derive(Debug, Clone, FromRow)]
pub struct EventTypeEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub fee_reimbursed: bool,
    pub food_included: bool,
    pub rental_kart: bool,
}

/// Event row with derived activity counts for listings.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithCountsEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cancelled: bool,
    pub type_id: Option<Uuid>,
    pub type_name: Option<String>,
    pub activity_count: i64,
    pub available_count: i64,
}
