//! Staff reporting DTOs: double bookings, completion tracking, readiness.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::MemberBrief;
use super::Pagination;

/// One implicated (member, event, activity) triple in the double-booking
/// report. Comment equality is the de-dup signal: generated clones of the
/// same task share a comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DoubleBookingRecord {
    pub member_id: Uuid,
    pub member_fullname: String,
    pub event_id: Uuid,
    pub event_name: String,
    pub activity_id: Uuid,
    pub activity_name: String,
    pub activity_comment: String,
}

/// A past assigned activity awaiting a completed/not-completed decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CompletionItem {
    pub activity_id: Uuid,
    pub activity_name: String,
    pub event_id: Uuid,
    pub event_name: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    pub assigned: MemberBrief,
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Query parameters for the completion tracker.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompletionQuery {
    /// Also include activities whose outcome was recorded inside the
    /// rolling window (default: only undetermined ones).
    #[serde(default)]
    pub include_resolved: bool,
}

/// Member row in the readiness reports, with the quota-relevant weight.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberReadinessItem {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub email_verified: bool,
    pub phone_number: String,
    pub phone_verified: bool,
    pub membercard_number: String,
    pub booked_weight: f64,
}

/// Paginated readiness report response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberReadinessResponse {
    pub data: Vec<MemberReadinessItem>,
    pub pagination: Pagination,
}

/// Paginated double-booking report response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DoubleBookingResponse {
    pub data: Vec<DoubleBookingRecord>,
    pub pagination: Pagination,
}

/// Paginated completion tracker response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CompletionResponse {
    pub data: Vec<CompletionItem>,
    pub pagination: Pagination,
}

/// Query parameters shared by year-scoped reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct YearQuery {
    /// Defaults to the current year when absent.
    #[serde(default)]
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_query_defaults() {
        let query: YearQuery = serde_json::from_str("{}").unwrap();
        assert!(query.year.is_none());
    }

    #[test]
    fn test_completion_query_defaults() {
        let query: CompletionQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.include_resolved);
    }
}
