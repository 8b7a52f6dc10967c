//! Event repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{EventEntity, EventTypeEntity, EventWithCountsEntity, MemberBriefEntity};
use crate::metrics::QueryTimer;

const EVENT_COLUMNS: &str = "id, name, description, start_date, end_date, comment, type_id, \
     cancelled, created_at, updated_at";

// An unassigned slot is only available once any earliest_bookable_date
// gate has passed.
const COUNTS_SELECT: &str = r#"
    SELECT e.id, e.name, e.description, e.start_date, e.end_date, e.cancelled,
           e.type_id, t.name AS type_name,
           COUNT(a.id) AS activity_count,
           COUNT(a.id) FILTER (
               WHERE a.assigned_member_id IS NULL AND NOT a.cancelled
                 AND (a.earliest_bookable_date IS NULL
                      OR a.earliest_bookable_date <= CURRENT_DATE)
           ) AS available_count
    FROM events e
    LEFT JOIN event_types t ON t.id = e.type_id
    LEFT JOIN activities a ON a.event_id = e.id
"#;

const COUNTS_GROUP: &str = "GROUP BY e.id, t.name";

/// Repository for event-related database operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an event with its activity counts.
    pub async fn find_with_counts(
        &self,
        id: Uuid,
    ) -> Result<Option<EventWithCountsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_with_counts");
        let result = sqlx::query_as::<_, EventWithCountsEntity>(&format!(
            "{COUNTS_SELECT} WHERE e.id = $1 {COUNTS_GROUP}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List events with counts, newest first. `upcoming` restricts to events
    /// that have not yet ended.
    pub async fn list(
        &self,
        upcoming: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventWithCountsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events");
        let result = sqlx::query_as::<_, EventWithCountsEntity>(&format!(
            r#"
            {COUNTS_SELECT}
            WHERE (NOT $1 OR e.end_date >= CURRENT_DATE)
            {COUNTS_GROUP}
            ORDER BY e.start_date DESC, e.name
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(upcoming)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count events under the same filter as [`list`](Self::list).
    pub async fn count(&self, upcoming: bool) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_events");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM events WHERE (NOT $1 OR end_date >= CURRENT_DATE)",
        )
        .bind(upcoming)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Event type reference data, ordered by name.
    pub async fn list_event_types(&self) -> Result<Vec<EventTypeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_types");
        let result = sqlx::query_as::<_, EventTypeEntity>(
            "SELECT id, name, description, fee_reimbursed, food_included, rental_kart
             FROM event_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Coordinators of an event, recipients of the double-booking and
    /// delist-request notifications.
    pub async fn list_coordinators(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<MemberBriefEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_event_coordinators");
        let result = sqlx::query_as::<_, MemberBriefEntity>(
            r#"
            SELECT m.id, m.fullname
            FROM event_coordinators ec
            JOIN members m ON m.id = ec.member_id
            WHERE ec.event_id = $1
            ORDER BY m.fullname
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
