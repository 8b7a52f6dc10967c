//! Staff report endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Utc};

use domain::models::member::MemberBrief;
use domain::models::report::{
    CompletionItem, CompletionQuery, CompletionResponse, DoubleBookingRecord,
    DoubleBookingResponse, MemberReadinessItem, MemberReadinessResponse, YearQuery,
};
use domain::models::{PageQuery, Pagination};
use persistence::repositories::{ReadinessFilter, ReportRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

/// GET /api/v1/reports/double-booked
///
/// Members holding two same-comment activities inside one event. The
/// report is small and bounded by the membership, so it is not paginated
/// at the database level.
#[axum::debug_handler]
pub async fn double_booked(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<YearQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<DoubleBookingResponse>, ApiError> {
    caller.require_staff()?;

    let rows = ReportRepository::new(state.pool.clone())
        .double_bookings(query.year)
        .await?;
    let total = rows.len() as i64;

    let data = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .map(|r| DoubleBookingRecord {
            member_id: r.member_id,
            member_fullname: r.member_fullname,
            event_id: r.event_id,
            event_name: r.event_name,
            activity_id: r.activity_id,
            activity_name: r.activity_name,
            activity_comment: r.activity_comment,
        })
        .collect();

    Ok(Json(DoubleBookingResponse {
        data,
        pagination: Pagination {
            page: page.page.max(1),
            per_page: page.limit(),
            total,
        },
    }))
}

async fn readiness_report(
    state: &AppState,
    caller: Caller,
    query: YearQuery,
    page: PageQuery,
    filter: ReadinessFilter,
) -> Result<Json<MemberReadinessResponse>, ApiError> {
    caller.require_staff()?;

    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let min_weight = state.config.booking.min_signup_weight;

    let repo = ReportRepository::new(state.pool.clone());
    let rows = repo
        .readiness(filter, year, min_weight, page.limit(), page.offset())
        .await?;
    let total = repo.readiness_count(filter, year, min_weight).await?;

    let data = rows
        .into_iter()
        .map(|r| MemberReadinessItem {
            id: r.id,
            fullname: r.fullname,
            email: r.email,
            email_verified: r.email_verified,
            phone_number: r.phone_number,
            phone_verified: r.phone_verified,
            membercard_number: r.membercard_number,
            booked_weight: r.booked_weight,
        })
        .collect();

    Ok(Json(MemberReadinessResponse {
        data,
        pagination: Pagination {
            page: page.page.max(1),
            per_page: page.limit(),
            total,
        },
    }))
}

/// GET /api/v1/reports/members/ready
#[axum::debug_handler]
pub async fn members_ready(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<YearQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<MemberReadinessResponse>, ApiError> {
    readiness_report(&state, caller, query, page, ReadinessFilter::Ready).await
}

/// GET /api/v1/reports/members/not-ready
#[axum::debug_handler]
pub async fn members_not_ready(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<YearQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<MemberReadinessResponse>, ApiError> {
    readiness_report(&state, caller, query, page, ReadinessFilter::NotReady).await
}

/// GET /api/v1/reports/members/has-card
#[axum::debug_handler]
pub async fn members_has_card(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<YearQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<MemberReadinessResponse>, ApiError> {
    readiness_report(&state, caller, query, page, ReadinessFilter::HasCard).await
}

/// GET /api/v1/reports/completion
#[axum::debug_handler]
pub async fn completion(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<CompletionQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<CompletionResponse>, ApiError> {
    caller.require_staff()?;

    let repo = ReportRepository::new(state.pool.clone());
    let rows = repo
        .completion_review(query.include_resolved, page.limit(), page.offset())
        .await?;
    let total = repo.completion_review_count(query.include_resolved).await?;

    let data = rows
        .into_iter()
        .map(|r| CompletionItem {
            activity_id: r.activity_id,
            activity_name: r.activity_name,
            event_id: r.event_id,
            event_name: r.event_name,
            date: r.date,
            start_time: r.start_time,
            end_time: r.end_time,
            assigned: MemberBrief {
                id: r.assigned_member_id,
                fullname: r.assigned_fullname,
            },
            confirmed: r.confirmed,
            completed: r.completed,
            completed_at: r.completed_at,
        })
        .collect();

    Ok(Json(CompletionResponse {
        data,
        pagination: Pagination {
            page: page.page.max(1),
            per_page: page.limit(),
            total,
        },
    }))
}
