//! Event endpoint handlers: listings with derived availability, detail
//! views and the per-event activity list.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use domain::models::activity::ActivityItem;
use domain::models::event::{EventItem, EventTypeBrief, EventTypeItem, ListEventsQuery};
use domain::models::member::MemberBrief;
use domain::models::{PageQuery, Pagination};
use persistence::entities::EventWithCountsEntity;
use persistence::repositories::{ActivityRepository, EventRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::routes::activities::activity_item;

/// Paginated event listing response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListEventsResponse {
    pub data: Vec<EventItem>,
    pub pagination: Pagination,
}

fn event_item(entity: EventWithCountsEntity, coordinators: Vec<MemberBrief>) -> EventItem {
    let today = Utc::now().date_naive();
    let has_bookable_activities =
        !entity.cancelled && entity.end_date >= today && entity.available_count > 0;

    EventItem {
        id: entity.id,
        name: entity.name,
        description: entity.description,
        start_date: entity.start_date,
        end_date: entity.end_date,
        cancelled: entity.cancelled,
        event_type: match (entity.type_id, entity.type_name) {
            (Some(id), Some(name)) => Some(EventTypeBrief { id, name }),
            _ => None,
        },
        coordinators,
        activity_count: entity.activity_count,
        available_count: entity.available_count,
        has_bookable_activities,
    }
}

/// GET /api/v1/events
#[axum::debug_handler]
pub async fn list_events(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<ListEventsQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListEventsResponse>, ApiError> {
    let repo = EventRepository::new(state.pool.clone());

    let rows = repo
        .list(query.upcoming, page.limit(), page.offset())
        .await?;
    let total = repo.count(query.upcoming).await?;

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        let coordinators = repo
            .list_coordinators(row.id)
            .await?
            .into_iter()
            .map(|c| MemberBrief {
                id: c.id,
                fullname: c.fullname,
            })
            .collect();
        data.push(event_item(row, coordinators));
    }

    Ok(Json(ListEventsResponse {
        data,
        pagination: Pagination {
            page: page.page.max(1),
            per_page: page.limit(),
            total,
        },
    }))
}

/// GET /api/v1/events/:event_id
#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    _caller: Caller,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventItem>, ApiError> {
    let repo = EventRepository::new(state.pool.clone());
    let event = repo
        .find_with_counts(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let coordinators = repo
        .list_coordinators(event_id)
        .await?
        .into_iter()
        .map(|c| MemberBrief {
            id: c.id,
            fullname: c.fullname,
        })
        .collect();

    Ok(Json(event_item(event, coordinators)))
}

/// GET /api/v1/events/:event_id/activities
#[axum::debug_handler]
pub async fn list_event_activities(
    State(state): State<AppState>,
    _caller: Caller,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<ActivityItem>>, ApiError> {
    let event_repo = EventRepository::new(state.pool.clone());
    if event_repo.find_by_id(event_id).await?.is_none() {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    let activities = ActivityRepository::new(state.pool.clone())
        .list_for_event(event_id)
        .await?
        .into_iter()
        .map(activity_item)
        .collect();

    Ok(Json(activities))
}

/// GET /api/v1/event-types
#[axum::debug_handler]
pub async fn list_event_types(
    State(state): State<AppState>,
    _caller: Caller,
) -> Result<Json<Vec<EventTypeItem>>, ApiError> {
    let types = EventRepository::new(state.pool.clone())
        .list_event_types()
        .await?
        .into_iter()
        .map(|t| EventTypeItem {
            id: t.id,
            name: t.name,
            description: t.description,
            fee_reimbursed: t.fee_reimbursed,
            food_included: t.food_included,
            rental_kart: t.rental_kart,
        })
        .collect();

    Ok(Json(types))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn counts_entity(end_date: NaiveDate, available: i64) -> EventWithCountsEntity {
        EventWithCountsEntity {
            id: Uuid::new_v4(),
            name: "Race weekend".into(),
            description: String::new(),
            start_date: end_date - Duration::days(1),
            end_date,
            cancelled: false,
            type_id: None,
            type_name: None,
            activity_count: 10,
            available_count: available,
        }
    }

    #[test]
    fn test_past_event_has_no_bookable_activities() {
        let past = Utc::now().date_naive() - Duration::days(7);
        let item = event_item(counts_entity(past, 5), vec![]);
        assert!(!item.has_bookable_activities);
    }

    #[test]
    fn test_upcoming_event_with_open_slots_is_bookable() {
        let future = Utc::now().date_naive() + Duration::days(7);
        let item = event_item(counts_entity(future, 5), vec![]);
        assert!(item.has_bookable_activities);
    }

    #[test]
    fn test_fully_booked_event_is_not_bookable() {
        let future = Utc::now().date_naive() + Duration::days(7);
        let item = event_item(counts_entity(future, 0), vec![]);
        assert!(!item.has_bookable_activities);
    }

    #[test]
    fn test_gated_slots_do_not_count_as_available() {
        // The repository excludes slots whose earliest_bookable_date lies in
        // the future, so an event whose only open slots are gated arrives
        // with available_count 0 and must not present as bookable.
        let future = Utc::now().date_naive() + Duration::days(7);
        let mut entity = counts_entity(future, 0);
        entity.activity_count = 4;
        let item = event_item(entity, vec![]);
        assert_eq!(item.available_count, 0);
        assert!(!item.has_bookable_activities);
    }
}
