//! Activity endpoint handlers: detail view, enlist/delist, confirmation
//! and completion tracking.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use domain::models::activity::{
    ActivityItem, ActivityTypeBrief, DelistResponse, EnlistRequest, EnlistResponse,
    SetCompletedRequest,
};
use domain::models::member::MemberBrief;
use persistence::entities::ActivityWithDetailsEntity;
use persistence::repositories::ActivityRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::services::BookingService;

/// Maps a joined activity row to its response shape.
pub(crate) fn activity_item(entity: ActivityWithDetailsEntity) -> ActivityItem {
    ActivityItem {
        id: entity.id,
        event_id: entity.event_id,
        name: entity.name,
        comment: entity.comment,
        activity_type: match (entity.type_id, entity.type_name) {
            (Some(id), Some(name)) => Some(ActivityTypeBrief { id, name }),
            _ => None,
        },
        date: entity.date,
        start_time: entity.start_time,
        end_time: entity.end_time,
        weight: entity.weight,
        assigned: match (entity.assigned_member_id, entity.assigned_fullname) {
            (Some(id), Some(fullname)) => Some(MemberBrief { id, fullname }),
            _ => None,
        },
        assigned_for_proxy: match (entity.assigned_for_proxy_id, entity.proxy_fullname) {
            (Some(id), Some(fullname)) => Some(MemberBrief { id, fullname }),
            _ => None,
        },
        assigned_at: entity.assigned_at,
        confirmed: entity.confirmed,
        completed: entity.completed,
        cancelled: entity.cancelled,
        earliest_bookable_date: entity.earliest_bookable_date,
        delist_requested: entity.delist_requested,
    }
}

/// GET /api/v1/activities/:activity_id
#[axum::debug_handler]
pub async fn get_activity(
    State(state): State<AppState>,
    _caller: Caller,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<ActivityItem>, ApiError> {
    let repo = ActivityRepository::new(state.pool.clone());
    let activity = repo
        .find_with_details(activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    Ok(Json(activity_item(activity)))
}

/// POST /api/v1/activities/:activity_id/enlist
#[axum::debug_handler]
pub async fn enlist(
    State(state): State<AppState>,
    caller: Caller,
    Path(activity_id): Path<Uuid>,
    Json(body): Json<EnlistRequest>,
) -> Result<Json<EnlistResponse>, ApiError> {
    let service = BookingService::new(&state);
    let response = service.enlist(caller, activity_id, body.as_member_id).await?;
    Ok(Json(response))
}

/// POST /api/v1/activities/:activity_id/delist
///
/// Staff hard delist: releases the slot without a request.
#[axum::debug_handler]
pub async fn delist(
    State(state): State<AppState>,
    caller: Caller,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<DelistResponse>, ApiError> {
    let service = BookingService::new(&state);
    let response = service.hard_delist(caller, activity_id).await?;
    Ok(Json(response))
}

/// POST /api/v1/activities/:activity_id/confirm
///
/// The assignee acknowledges the reminder for their activity.
#[axum::debug_handler]
pub async fn confirm(
    State(state): State<AppState>,
    caller: Caller,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<ActivityItem>, ApiError> {
    let repo = ActivityRepository::new(state.pool.clone());
    let confirmed = repo.confirm(activity_id, caller.member_id).await?;
    if !confirmed {
        return Err(ApiError::NotFound(
            "Activity not found or not assigned to you".to_string(),
        ));
    }

    tracing::info!(
        activity_id = %activity_id,
        member_id = %caller.member_id,
        "Activity confirmed by assignee"
    );

    let activity = repo
        .find_with_details(activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;
    Ok(Json(activity_item(activity)))
}

/// PATCH /api/v1/activities/:activity_id/completed
///
/// Staff records (or clears) the completion outcome of a past activity.
#[axum::debug_handler]
pub async fn set_completed(
    State(state): State<AppState>,
    caller: Caller,
    Path(activity_id): Path<Uuid>,
    Json(body): Json<SetCompletedRequest>,
) -> Result<Json<ActivityItem>, ApiError> {
    caller.require_staff()?;

    let repo = ActivityRepository::new(state.pool.clone());
    let updated = repo
        .set_completed(activity_id, body.completed)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    tracing::info!(
        activity_id = %updated.id,
        staff_id = %caller.member_id,
        completed = ?body.completed,
        "Activity completion recorded"
    );

    let activity = repo
        .find_with_details(activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;
    Ok(Json(activity_item(activity)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn details_entity() -> ActivityWithDetailsEntity {
        ActivityWithDetailsEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "Flag marshal".into(),
            comment: "Slot A".into(),
            type_id: Some(Uuid::new_v4()),
            type_name: Some("Marshal".into()),
            date: NaiveDate::from_ymd_opt(2026, 6, 13).unwrap(),
            start_time: None,
            end_time: None,
            weight: 1.5,
            assigned_member_id: None,
            assigned_fullname: None,
            assigned_for_proxy_id: None,
            proxy_fullname: None,
            assigned_at: None,
            confirmed: false,
            completed: None,
            cancelled: false,
            earliest_bookable_date: None,
            delist_requested: false,
        }
    }

    #[test]
    fn test_activity_item_mapping() {
        let entity = details_entity();
        let id = entity.id;
        let item = activity_item(entity);
        assert_eq!(item.id, id);
        assert_eq!(item.activity_type.as_ref().unwrap().name, "Marshal");
        assert!(item.assigned.is_none());
        assert!(!item.delist_requested);
    }

    #[test]
    fn test_activity_item_drops_half_populated_joins() {
        let mut entity = details_entity();
        entity.type_name = None;
        let item = activity_item(entity);
        assert!(item.activity_type.is_none());
    }
}
