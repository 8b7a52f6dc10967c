//! Delist request endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use domain::models::delist_request::{
    ActivityBrief, CreateDelistRequestRequest, DelistRequestItem, DelistRequestStatus,
    ListDelistRequestsQuery, ListDelistRequestsResponse, ResolveDelistRequestRequest,
};
use domain::models::member::MemberBrief;
use domain::models::{PageQuery, Pagination};
use persistence::entities::DelistRequestWithDetailsEntity;
use persistence::repositories::DelistRequestRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::services::BookingService;

fn delist_item(entity: DelistRequestWithDetailsEntity) -> DelistRequestItem {
    DelistRequestItem {
        id: entity.id,
        member: MemberBrief {
            id: entity.member_id,
            fullname: entity.member_fullname,
        },
        activity: ActivityBrief {
            id: entity.activity_id,
            name: entity.activity_name,
            event_id: entity.event_id,
            event_name: entity.event_name,
        },
        reason: entity.reason,
        status: DelistRequestStatus::from_approved(entity.approved),
        approved_by: match (entity.approved_by, entity.approver_fullname) {
            (Some(id), Some(fullname)) => Some(MemberBrief { id, fullname }),
            _ => None,
        },
        reject_reason: entity.reject_reason,
        created_at: entity.created_at,
        resolved_at: entity.resolved_at,
    }
}

/// Maps the status query filter to the stored tri-state `approved` column.
fn status_filter(status: Option<DelistRequestStatus>) -> Option<Option<bool>> {
    status.map(|s| match s {
        DelistRequestStatus::Pending => None,
        DelistRequestStatus::Approved => Some(true),
        DelistRequestStatus::Rejected => Some(false),
    })
}

/// POST /api/v1/delist-requests
#[axum::debug_handler]
pub async fn create_delist_request(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<CreateDelistRequestRequest>,
) -> Result<(StatusCode, Json<DelistRequestItem>), ApiError> {
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::Validation("A reason is required".to_string()));
    }

    let service = BookingService::new(&state);
    let request_id = service
        .file_delist_request(caller, body.activity_id, reason)
        .await?;

    let request = DelistRequestRepository::new(state.pool.clone())
        .find_with_details(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Delist request not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(delist_item(request))))
}

/// GET /api/v1/delist-requests
///
/// Members see their own requests; staff see everyone's.
#[axum::debug_handler]
pub async fn list_delist_requests(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListDelistRequestsQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListDelistRequestsResponse>, ApiError> {
    let member_scope = if caller.staff {
        None
    } else {
        Some(caller.member_id)
    };
    let approved = status_filter(query.status);

    let repo = DelistRequestRepository::new(state.pool.clone());
    let rows = repo
        .list(member_scope, approved, page.limit(), page.offset())
        .await?;
    let total = repo.count(member_scope, approved).await?;

    Ok(Json(ListDelistRequestsResponse {
        data: rows.into_iter().map(delist_item).collect(),
        pagination: Pagination {
            page: page.page.max(1),
            per_page: page.limit(),
            total,
        },
    }))
}

/// GET /api/v1/delist-requests/:request_id
#[axum::debug_handler]
pub async fn get_delist_request(
    State(state): State<AppState>,
    caller: Caller,
    Path(request_id): Path<Uuid>,
) -> Result<Json<DelistRequestItem>, ApiError> {
    let request = DelistRequestRepository::new(state.pool.clone())
        .find_with_details(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Delist request not found".to_string()))?;

    caller.require_self_or_staff(request.member_id)?;

    Ok(Json(delist_item(request)))
}

/// PATCH /api/v1/delist-requests/:request_id
///
/// Staff resolves a pending request, one shot.
#[axum::debug_handler]
pub async fn resolve_delist_request(
    State(state): State<AppState>,
    caller: Caller,
    Path(request_id): Path<Uuid>,
    Json(body): Json<ResolveDelistRequestRequest>,
) -> Result<Json<DelistRequestItem>, ApiError> {
    let service = BookingService::new(&state);
    service
        .resolve_delist_request(caller, request_id, body.approved, body.reject_reason.as_deref())
        .await?;

    let request = DelistRequestRepository::new(state.pool.clone())
        .find_with_details(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Delist request not found".to_string()))?;

    Ok(Json(delist_item(request)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn details_entity(approved: Option<bool>) -> DelistRequestWithDetailsEntity {
        DelistRequestWithDetailsEntity {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            member_fullname: "Anna Andersson".into(),
            activity_id: Uuid::new_v4(),
            activity_name: "Flag marshal".into(),
            event_id: Uuid::new_v4(),
            event_name: "Race weekend".into(),
            reason: "Away that weekend".into(),
            approved,
            approved_by: None,
            approver_fullname: None,
            reject_reason: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn test_delist_item_status_mapping() {
        assert_eq!(
            delist_item(details_entity(None)).status,
            DelistRequestStatus::Pending
        );
        assert_eq!(
            delist_item(details_entity(Some(true))).status,
            DelistRequestStatus::Approved
        );
        assert_eq!(
            delist_item(details_entity(Some(false))).status,
            DelistRequestStatus::Rejected
        );
    }

    #[test]
    fn test_status_filter_mapping() {
        assert_eq!(status_filter(None), None);
        assert_eq!(status_filter(Some(DelistRequestStatus::Pending)), Some(None));
        assert_eq!(
            status_filter(Some(DelistRequestStatus::Approved)),
            Some(Some(true))
        );
        assert_eq!(
            status_filter(Some(DelistRequestStatus::Rejected)),
            Some(Some(false))
        );
    }
}
