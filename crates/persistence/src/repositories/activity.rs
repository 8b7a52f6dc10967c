//! Activity repository for database operations.
//!
//! The assignment writes here are the serialization point for the booking
//! engine: every claim is a conditional UPDATE re-validating the slot, so
//! of two concurrent enlists exactly one row wins.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ActivityEntity, ActivityForBookingEntity, ActivityWithDetailsEntity};
use crate::metrics::QueryTimer;

const ACTIVITY_COLUMNS: &str = "id, event_id, type_id, name, comment, date, start_time, \
     end_time, weight, assigned_member_id, assigned_for_proxy_id, assigned_at, confirmed, \
     completed, completed_at, cancelled, earliest_bookable_date, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.event_id, a.name, a.comment, a.type_id, t.name AS type_name,
           a.date, a.start_time, a.end_time, a.weight,
           a.assigned_member_id, m.fullname AS assigned_fullname,
           a.assigned_for_proxy_id, p.fullname AS proxy_fullname,
           a.assigned_at, a.confirmed, a.completed, a.cancelled,
           a.earliest_bookable_date,
           EXISTS (
               SELECT 1 FROM activity_delist_requests adr
               WHERE adr.activity_id = a.id AND adr.approved IS NULL
           ) AS delist_requested
    FROM activities a
    LEFT JOIN activity_types t ON t.id = a.type_id
    LEFT JOIN members m ON m.id = a.assigned_member_id
    LEFT JOIN members p ON p.id = a.assigned_for_proxy_id
"#;

/// Repository for activity-related database operations.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an activity by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ActivityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_activity_by_id");
        let result = sqlx::query_as::<_, ActivityEntity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an activity with joined names for detail views.
    pub async fn find_with_details(
        &self,
        id: Uuid,
    ) -> Result<Option<ActivityWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_activity_with_details");
        let result = sqlx::query_as::<_, ActivityWithDetailsEntity>(&format!(
            "{DETAIL_SELECT} WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List activities for an event, ordered by time.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<ActivityWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_activities_for_event");
        let result = sqlx::query_as::<_, ActivityWithDetailsEntity>(&format!(
            "{DETAIL_SELECT} WHERE a.event_id = $1 ORDER BY a.date, a.start_time, a.name"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a member's own and proxy-held assignments.
    pub async fn list_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<ActivityWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_activities_for_member");
        let result = sqlx::query_as::<_, ActivityWithDetailsEntity>(&format!(
            "{DETAIL_SELECT} WHERE a.assigned_member_id = $1 OR a.assigned_for_proxy_id = $1
             ORDER BY a.date, a.start_time, a.name"
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Snapshot of the activity with the booking-relevant event fields.
    pub async fn snapshot_for_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<ActivityForBookingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("activity_snapshot_for_booking");
        let result = sqlx::query_as::<_, ActivityForBookingEntity>(
            r#"
            SELECT a.id, a.event_id, a.name, a.date, a.start_time, a.end_time, a.weight,
                   a.cancelled, a.earliest_bookable_date,
                   a.assigned_member_id, m.fullname AS assigned_fullname,
                   e.start_date AS event_start_date, e.end_date AS event_end_date,
                   e.cancelled AS event_cancelled,
                   EXISTS (
                       SELECT 1 FROM activity_delist_requests adr
                       WHERE adr.activity_id = a.id AND adr.approved IS NULL
                   ) AS has_pending_delist
            FROM activities a
            JOIN events e ON e.id = a.event_id
            LEFT JOIN members m ON m.id = a.assigned_member_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Claim an open slot. The `assigned_member_id IS NULL` condition is
    /// what serializes concurrent enlists; `None` means someone else won.
    pub async fn assign_if_open(
        &self,
        id: Uuid,
        member_id: Uuid,
        for_proxy_id: Option<Uuid>,
    ) -> Result<Option<ActivityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("assign_activity_if_open");
        let result = sqlx::query_as::<_, ActivityEntity>(&format!(
            r#"
            UPDATE activities
            SET assigned_member_id = $2, assigned_for_proxy_id = $3,
                assigned_at = NOW(), confirmed = FALSE, updated_at = NOW()
            WHERE id = $1 AND assigned_member_id IS NULL AND NOT cancelled
            RETURNING {ACTIVITY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(member_id)
        .bind(for_proxy_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Take over a slot whose holder has a pending delist request: delete
    /// the stale requests and reassign in one transaction. `from_member_id`
    /// is the expected outgoing holder (or `None` for an open slot with
    /// leftover requests); `None` out means the slot changed under us.
    pub async fn transfer(
        &self,
        id: Uuid,
        from_member_id: Option<Uuid>,
        to_member_id: Uuid,
        for_proxy_id: Option<Uuid>,
        stale_request_ids: &[Uuid],
    ) -> Result<Option<ActivityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("transfer_activity");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM activity_delist_requests WHERE id = ANY($1) AND approved IS NULL",
        )
        .bind(stale_request_ids)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query_as::<_, ActivityEntity>(&format!(
            r#"
            UPDATE activities
            SET assigned_member_id = $3, assigned_for_proxy_id = $4,
                assigned_at = NOW(), confirmed = FALSE, updated_at = NOW()
            WHERE id = $1 AND assigned_member_id IS NOT DISTINCT FROM $2 AND NOT cancelled
            RETURNING {ACTIVITY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(from_member_id)
        .bind(to_member_id)
        .bind(for_proxy_id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_some() {
            tx.commit().await?;
        } else {
            // Holder changed under us; leave the requests alone.
            tx.rollback().await?;
        }

        timer.record();
        Ok(updated)
    }

    /// Release the slot only if still held by `member_id` (ADR approval
    /// after a transfer must not touch the new holder's assignment).
    pub async fn release_if_held_by(
        &self,
        id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("release_activity_if_held_by");
        let result = sqlx::query(
            r#"
            UPDATE activities
            SET assigned_member_id = NULL, assigned_for_proxy_id = NULL,
                assigned_at = NULL, confirmed = FALSE, updated_at = NOW()
            WHERE id = $1 AND assigned_member_id = $2
            "#,
        )
        .bind(id)
        .bind(member_id)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected() > 0);
        timer.record();
        result
    }

    /// Unconditional release (staff hard delist).
    pub async fn release(&self, id: Uuid) -> Result<Option<ActivityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("release_activity");
        let result = sqlx::query_as::<_, ActivityEntity>(&format!(
            r#"
            UPDATE activities
            SET assigned_member_id = NULL, assigned_for_proxy_id = NULL,
                assigned_at = NULL, confirmed = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACTIVITY_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Assignee acknowledges the reminder.
    pub async fn confirm(&self, id: Uuid, member_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("confirm_activity");
        let result = sqlx::query(
            r#"
            UPDATE activities
            SET confirmed = TRUE, updated_at = NOW()
            WHERE id = $1 AND assigned_member_id = $2
            "#,
        )
        .bind(id)
        .bind(member_id)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected() > 0);
        timer.record();
        result
    }

    /// Record (or clear) the staff-confirmed completion outcome.
    pub async fn set_completed(
        &self,
        id: Uuid,
        completed: Option<bool>,
    ) -> Result<Option<ActivityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_activity_completed");
        let result = sqlx::query_as::<_, ActivityEntity>(&format!(
            r#"
            UPDATE activities
            SET completed = $2,
                completed_at = CASE WHEN $2 IS NULL THEN NULL ELSE NOW() END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ACTIVITY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
