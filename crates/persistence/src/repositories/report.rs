//! Reporting queries.
//!
//! These are read-only aggregations over the booking tables; each returns
//! plain row entities and leaves presentation to the API layer.

use sqlx::PgPool;

use crate::entities::{
    CompletionRowEntity, DoubleBookingRowEntity, MemberReadinessRowEntity, ReminderRowEntity,
};
use crate::metrics::QueryTimer;

/// Which slice of the membership a readiness query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessFilter {
    Ready,
    NotReady,
    HasCard,
}

// Booked weight per member for one year. Attribution follows assignments:
// a proxy booking counts for the member it is for, not the holder. Pending
// delist requests take the activity out of the sum.
const READINESS_SELECT: &str = r#"
    SELECT m.id, m.fullname, m.email, m.email_verified,
           m.phone_number, m.phone_verified, m.membercard_number,
           CAST(COALESCE(bw.weight, 0) + m.signup_bias AS DOUBLE PRECISION)
               AS booked_weight
    FROM members m
    LEFT JOIN (
        SELECT COALESCE(a.assigned_for_proxy_id, a.assigned_member_id) AS member_id,
               SUM(a.weight) AS weight
        FROM activities a
        JOIN events e ON e.id = a.event_id
        WHERE a.assigned_member_id IS NOT NULL
          AND NOT a.cancelled
          AND CAST(EXTRACT(YEAR FROM e.start_date) AS INTEGER) = $1
          AND NOT EXISTS (
              SELECT 1 FROM activity_delist_requests adr
              WHERE adr.activity_id = a.id AND adr.approved IS NULL
          )
        GROUP BY COALESCE(a.assigned_for_proxy_id, a.assigned_member_id)
    ) bw ON bw.member_id = m.id
"#;

// "Ready" means ready to be issued a card: verified, enough weight, and no
// card yet. "Not ready" is the complement among members still missing
// something, restricted to those below the threshold.
fn readiness_condition(filter: ReadinessFilter) -> &'static str {
    match filter {
        ReadinessFilter::Ready => {
            "m.email_verified AND m.phone_verified AND m.membercard_number = ''
             AND COALESCE(bw.weight, 0) + m.signup_bias >= $2"
        }
        ReadinessFilter::NotReady => {
            "(NOT m.email_verified OR NOT m.phone_verified OR m.membercard_number = '')
             AND COALESCE(bw.weight, 0) + m.signup_bias < $2"
        }
        ReadinessFilter::HasCard => "m.membercard_number <> '' AND $2 = $2",
    }
}

/// Repository for report and reminder queries.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Creates a new ReportRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Members matching a readiness filter for `year`, ordered by name.
    pub async fn readiness(
        &self,
        filter: ReadinessFilter,
        year: i32,
        min_weight: f64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MemberReadinessRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("report_readiness");
        let condition = readiness_condition(filter);
        let result = sqlx::query_as::<_, MemberReadinessRowEntity>(&format!(
            "{READINESS_SELECT} WHERE {condition} ORDER BY m.fullname LIMIT $3 OFFSET $4"
        ))
        .bind(year)
        .bind(min_weight)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count for a readiness filter.
    pub async fn readiness_count(
        &self,
        filter: ReadinessFilter,
        year: i32,
        min_weight: f64,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("report_readiness_count");
        let condition = readiness_condition(filter);
        let result = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM ({READINESS_SELECT} WHERE {condition}) AS r"
        ))
        .bind(year)
        .bind(min_weight)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Assignments where one member holds two activities of the same event
    /// that carry the same non-empty comment. Comment equality is the slot
    /// marker: two activities with the same comment run at the same time.
    pub async fn double_bookings(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<DoubleBookingRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("report_double_bookings");
        let result = sqlx::query_as::<_, DoubleBookingRowEntity>(
            r#"
            WITH booked AS (
                SELECT a.id, a.event_id, a.name, a.comment,
                       COALESCE(a.assigned_for_proxy_id, a.assigned_member_id) AS member_id
                FROM activities a
                WHERE a.assigned_member_id IS NOT NULL
                  AND NOT a.cancelled
                  AND a.comment <> ''
            )
            SELECT b.member_id, m.fullname AS member_fullname,
                   e.id AS event_id, e.name AS event_name,
                   b.id AS activity_id, b.name AS activity_name,
                   b.comment AS activity_comment
            FROM booked b
            JOIN members m ON m.id = b.member_id
            JOIN events e ON e.id = b.event_id
            WHERE EXISTS (
                      SELECT 1 FROM booked o
                      WHERE o.member_id = b.member_id
                        AND o.event_id = b.event_id
                        AND o.comment = b.comment
                        AND o.id <> b.id
                  )
              AND ($1::integer IS NULL
                   OR CAST(EXTRACT(YEAR FROM e.start_date) AS INTEGER) = $1)
            ORDER BY m.fullname, e.name, b.comment, b.name
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Past assigned activities, for the completion review. With
    /// `include_resolved` false only those still awaiting a decision.
    pub async fn completion_review(
        &self,
        include_resolved: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CompletionRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("report_completion_review");
        let result = sqlx::query_as::<_, CompletionRowEntity>(
            r#"
            SELECT a.id AS activity_id, a.name AS activity_name,
                   e.id AS event_id, e.name AS event_name,
                   a.date, a.start_time, a.end_time,
                   a.assigned_member_id, m.fullname AS assigned_fullname,
                   a.confirmed, a.completed, a.completed_at
            FROM activities a
            JOIN events e ON e.id = a.event_id
            JOIN members m ON m.id = a.assigned_member_id
            WHERE a.date < CURRENT_DATE
              AND NOT a.cancelled
              AND ($1 OR a.completed IS NULL)
            ORDER BY a.date DESC, a.start_time, a.name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(include_resolved)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count for the completion review filter.
    pub async fn completion_review_count(
        &self,
        include_resolved: bool,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("report_completion_review_count");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM activities a
            WHERE a.date < CURRENT_DATE
              AND NOT a.cancelled
              AND a.assigned_member_id IS NOT NULL
              AND ($1 OR a.completed IS NULL)
            "#,
        )
        .bind(include_resolved)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Tomorrow's activities for the reminder job: assigned, unconfirmed
    /// ones with their holders, plus still-unassigned slots (member fields
    /// NULL) so the job can flag them.
    pub async fn next_day_activities(&self) -> Result<Vec<ReminderRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("report_next_day_activities");
        let result = sqlx::query_as::<_, ReminderRowEntity>(
            r#"
            SELECT a.id AS activity_id, a.name AS activity_name,
                   a.date, a.start_time, a.end_time,
                   m.id AS member_id, m.fullname AS member_fullname,
                   m.email AS member_email, m.phone_number AS member_phone
            FROM activities a
            LEFT JOIN members m ON m.id = a.assigned_member_id
            WHERE a.date = CURRENT_DATE + INTERVAL '1 day'
              AND NOT a.cancelled
              AND (a.assigned_member_id IS NULL OR NOT a.confirmed)
            ORDER BY a.start_time, a.name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_conditions_reference_the_threshold() {
        assert!(readiness_condition(ReadinessFilter::Ready).contains("$2"));
        assert!(readiness_condition(ReadinessFilter::NotReady).contains("$2"));
        assert!(readiness_condition(ReadinessFilter::HasCard).contains("$2"));
    }

    #[test]
    fn test_ready_filter_selects_members_without_card() {
        // Ready lists candidates for card issuance, so card holders are out.
        let ready = readiness_condition(ReadinessFilter::Ready);
        assert!(ready.contains("m.membercard_number = ''"));
        assert!(!ready.contains("membercard_number <> ''"));

        let not_ready = readiness_condition(ReadinessFilter::NotReady);
        assert!(not_ready.contains("m.membercard_number = ''"));

        let has_card = readiness_condition(ReadinessFilter::HasCard);
        assert!(has_card.contains("m.membercard_number <> ''"));
    }
}
