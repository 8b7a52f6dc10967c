//! Activity delist request (ADR) DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::MemberBrief;
use super::Pagination;

/// Status of a delist request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelistRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl DelistRequestStatus {
    /// Maps the stored tri-state `approved` column to a status.
    pub fn from_approved(approved: Option<bool>) -> Self {
        match approved {
            None => DelistRequestStatus::Pending,
            Some(true) => DelistRequestStatus::Approved,
            Some(false) => DelistRequestStatus::Rejected,
        }
    }
}

impl std::fmt::Display for DelistRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DelistRequestStatus::Pending => write!(f, "pending"),
            DelistRequestStatus::Approved => write!(f, "approved"),
            DelistRequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Body for filing a delist request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateDelistRequestRequest {
    pub activity_id: Uuid,
    pub reason: String,
}

/// Brief activity info embedded in delist request listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityBrief {
    pub id: Uuid,
    pub name: String,
    pub event_id: Uuid,
    pub event_name: String,
}

/// Delist request for listing and detail views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DelistRequestItem {
    pub id: Uuid,
    pub member: MemberBrief,
    pub activity: ActivityBrief,
    pub reason: String,
    pub status: DelistRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<MemberBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Response for listing delist requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListDelistRequestsResponse {
    pub data: Vec<DelistRequestItem>,
    pub pagination: Pagination,
}

/// Staff body for resolving a delist request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolveDelistRequestRequest {
    pub approved: bool,
    #[serde(default)]
    pub reject_reason: Option<String>,
}

/// Query parameters for listing delist requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListDelistRequestsQuery {
    #[serde(default)]
    pub status: Option<DelistRequestStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_approved() {
        assert_eq!(
            DelistRequestStatus::from_approved(None),
            DelistRequestStatus::Pending
        );
        assert_eq!(
            DelistRequestStatus::from_approved(Some(true)),
            DelistRequestStatus::Approved
        );
        assert_eq!(
            DelistRequestStatus::from_approved(Some(false)),
            DelistRequestStatus::Rejected
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(DelistRequestStatus::Pending.to_string(), "pending");
        assert_eq!(DelistRequestStatus::Approved.to_string(), "approved");
        assert_eq!(DelistRequestStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_create_request_deserialize() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"activity_id":"{}","reason":"Away that weekend"}}"#, id);
        let req: CreateDelistRequestRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.activity_id, id);
        assert_eq!(req.reason, "Away that weekend");
    }

    #[test]
    fn test_resolve_request_deserialize() {
        let req: ResolveDelistRequestRequest =
            serde_json::from_str(r#"{"approved":false,"reject_reason":"Too close to the event"}"#)
                .unwrap();
        assert!(!req.approved);
        assert_eq!(req.reject_reason.as_deref(), Some("Too close to the event"));

        let req: ResolveDelistRequestRequest =
            serde_json::from_str(r#"{"approved":true}"#).unwrap();
        assert!(req.approved);
        assert!(req.reject_reason.is_none());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListDelistRequestsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.status.is_none());
    }
}
