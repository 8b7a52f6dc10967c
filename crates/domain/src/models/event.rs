//! Event and event type DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::MemberBrief;

/// Brief event type info for embedding in event listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventTypeBrief {
    pub id: Uuid,
    pub name: String,
}

/// Full event type reference data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventTypeItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub fee_reimbursed: bool,
    pub food_included: bool,
    pub rental_kart: bool,
}

/// Event with derived booking availability.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventTypeBrief>,
    pub coordinators: Vec<MemberBrief>,
    /// Total activities in the event.
    pub activity_count: i64,
    /// Unassigned activities past any earliest-bookable gate.
    pub available_count: i64,
    /// False once the event's end date is in the past.
    pub has_bookable_activities: bool,
}

/// Query parameters for listing events.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListEventsQuery {
    /// Only events starting today or later.
    #[serde(default)]
    pub upcoming: bool,
}
