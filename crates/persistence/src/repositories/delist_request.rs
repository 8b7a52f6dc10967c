//! Delist request repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{DelistRequestEntity, DelistRequestWithDetailsEntity};
use crate::metrics::QueryTimer;

const ADR_COLUMNS: &str = "id, member_id, activity_id, reason, approved, approved_by, \
     reject_reason, created_at, updated_at, resolved_at";

const DETAIL_SELECT: &str = r#"
    SELECT adr.id, adr.member_id, m.fullname AS member_fullname,
           adr.activity_id, a.name AS activity_name,
           e.id AS event_id, e.name AS event_name,
           adr.reason, adr.approved, adr.approved_by,
           s.fullname AS approver_fullname,
           adr.reject_reason, adr.created_at, adr.resolved_at
    FROM activity_delist_requests adr
    JOIN members m ON m.id = adr.member_id
    JOIN activities a ON a.id = adr.activity_id
    JOIN events e ON e.id = a.event_id
    LEFT JOIN members s ON s.id = adr.approved_by
"#;

/// Repository for activity delist request database operations.
#[derive(Clone)]
pub struct DelistRequestRepository {
    pool: PgPool,
}

impl DelistRequestRepository {
    /// Creates a new DelistRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending delist request. The (member, activity) uniqueness
    /// constraint turns a duplicate into a 23505 database error.
    pub async fn create(
        &self,
        member_id: Uuid,
        activity_id: Uuid,
        reason: &str,
    ) -> Result<DelistRequestEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_delist_request");
        let result = sqlx::query_as::<_, DelistRequestEntity>(&format!(
            r#"
            INSERT INTO activity_delist_requests (member_id, activity_id, reason)
            VALUES ($1, $2, $3)
            RETURNING {ADR_COLUMNS}
            "#,
        ))
        .bind(member_id)
        .bind(activity_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Replace the reason of a still-pending request (re-file).
    pub async fn replace_reason(
        &self,
        id: Uuid,
        reason: &str,
    ) -> Result<Option<DelistRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("replace_delist_request_reason");
        let result = sqlx::query_as::<_, DelistRequestEntity>(&format!(
            r#"
            UPDATE activity_delist_requests
            SET reason = $2, updated_at = NOW()
            WHERE id = $1 AND approved IS NULL
            RETURNING {ADR_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DelistRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_delist_request_by_id");
        let result = sqlx::query_as::<_, DelistRequestEntity>(&format!(
            "SELECT {ADR_COLUMNS} FROM activity_delist_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a request with joined details.
    pub async fn find_with_details(
        &self,
        id: Uuid,
    ) -> Result<Option<DelistRequestWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_delist_request_with_details");
        let result = sqlx::query_as::<_, DelistRequestWithDetailsEntity>(&format!(
            "{DETAIL_SELECT} WHERE adr.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the request for a (member, activity) pair, any status.
    pub async fn find_for_member_activity(
        &self,
        member_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<DelistRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_delist_request_for_member_activity");
        let result = sqlx::query_as::<_, DelistRequestEntity>(&format!(
            "SELECT {ADR_COLUMNS} FROM activity_delist_requests
             WHERE member_id = $1 AND activity_id = $2"
        ))
        .bind(member_id)
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// IDs of pending requests for an activity (transfer cleanup input).
    pub async fn pending_ids_for_activity(
        &self,
        activity_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("pending_delist_request_ids");
        let result = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM activity_delist_requests WHERE activity_id = $1 AND approved IS NULL",
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// One-shot resolution: only a pending row transitions. `None` means
    /// the request was already resolved (or gone).
    pub async fn resolve(
        &self,
        id: Uuid,
        approved: bool,
        approved_by: Uuid,
        reject_reason: Option<&str>,
    ) -> Result<Option<DelistRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("resolve_delist_request");
        let result = sqlx::query_as::<_, DelistRequestEntity>(&format!(
            r#"
            UPDATE activity_delist_requests
            SET approved = $2, approved_by = $3, reject_reason = $4,
                resolved_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND approved IS NULL
            RETURNING {ADR_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(approved)
        .bind(approved_by)
        .bind(reject_reason)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List requests, optionally scoped to one member and/or one status.
    pub async fn list(
        &self,
        member_id: Option<Uuid>,
        approved: Option<Option<bool>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DelistRequestWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_delist_requests");
        // `approved` filter: None = any, Some(None) = pending only,
        // Some(Some(x)) = resolved with that decision.
        let (pending_only, decision) = match approved {
            None => (false, None),
            Some(None) => (true, None),
            Some(Some(d)) => (false, Some(d)),
        };
        let result = sqlx::query_as::<_, DelistRequestWithDetailsEntity>(&format!(
            r#"
            {DETAIL_SELECT}
            WHERE ($1::uuid IS NULL OR adr.member_id = $1)
              AND (NOT $2 OR adr.approved IS NULL)
              AND ($3::boolean IS NULL OR adr.approved = $3)
            ORDER BY adr.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        ))
        .bind(member_id)
        .bind(pending_only)
        .bind(decision)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count requests under the same filters as [`list`](Self::list).
    pub async fn count(
        &self,
        member_id: Option<Uuid>,
        approved: Option<Option<bool>>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_delist_requests");
        let (pending_only, decision) = match approved {
            None => (false, None),
            Some(None) => (true, None),
            Some(Some(d)) => (false, Some(d)),
        };
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM activity_delist_requests adr
            WHERE ($1::uuid IS NULL OR adr.member_id = $1)
              AND (NOT $2 OR adr.approved IS NULL)
              AND ($3::boolean IS NULL OR adr.approved = $3)
            "#,
        )
        .bind(member_id)
        .bind(pending_only)
        .bind(decision)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_adr_columns_are_consistent() {
        assert!(super::ADR_COLUMNS.contains("reject_reason"));
        assert!(super::ADR_COLUMNS.contains("resolved_at"));
    }
}
