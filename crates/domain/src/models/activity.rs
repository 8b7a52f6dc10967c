//! Activity (bookable task) DTOs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::MemberBrief;

/// Brief activity type info.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityTypeBrief {
    pub id: Uuid,
    pub name: String,
}

/// Activity as shown in event listings and detail views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityItem {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<ActivityTypeBrief>,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned: Option<MemberBrief>,
    /// Set when `assigned` is a proxy acting for this member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_for_proxy: Option<MemberBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_bookable_date: Option<NaiveDate>,
    /// True while a pending delist request exists for this activity.
    pub delist_requested: bool,
}

/// Body for enlisting on an activity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EnlistRequest {
    /// Book on behalf of this proxy-held member instead of the caller.
    #[serde(default)]
    pub as_member_id: Option<Uuid>,
}

/// Response after a successful enlist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EnlistResponse {
    pub activity_id: Uuid,
    pub message: String,
    /// True when the slot was taken over from a member with a pending
    /// delist request.
    pub transferred: bool,
}

/// Response after a staff delist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DelistResponse {
    pub activity_id: Uuid,
    pub message: String,
}

/// Staff body for recording the completed outcome of a past activity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetCompletedRequest {
    /// `null` returns the activity to the not-yet-evaluated state.
    pub completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enlist_request_default_body() {
        let req: EnlistRequest = serde_json::from_str("{}").unwrap();
        assert!(req.as_member_id.is_none());
    }

    #[test]
    fn test_enlist_request_proxy_body() {
        let id = Uuid::new_v4();
        let req: EnlistRequest =
            serde_json::from_str(&format!(r#"{{"as_member_id":"{}"}}"#, id)).unwrap();
        assert_eq!(req.as_member_id, Some(id));
    }

    #[test]
    fn test_set_completed_tri_state() {
        let req: SetCompletedRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(req.completed, Some(true));

        let req: SetCompletedRequest = serde_json::from_str(r#"{"completed":null}"#).unwrap();
        assert_eq!(req.completed, None);
    }
}
