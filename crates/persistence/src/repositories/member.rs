//! Member repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AssignmentRowEntity, MemberBriefEntity, MemberEntity};
use crate::metrics::QueryTimer;

const MEMBER_COLUMNS: &str = "id, user_id, fullname, email, email_verified, \
     email_verification_code, email_verification_sent_at, phone_number, phone_verified, \
     phone_verification_code, phone_verification_sent_at, membercard_number, signup_bias, \
     comment, created_at, updated_at";

/// Repository for member-related database operations.
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Creates a new MemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a member for a newly registered account.
    pub async fn create(
        &self,
        user_id: Uuid,
        fullname: &str,
        email: &str,
        phone_number: &str,
    ) -> Result<MemberEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_member");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            INSERT INTO members (user_id, fullname, email, phone_number)
            VALUES ($1, $2, $3, $4)
            RETURNING {MEMBER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(fullname)
        .bind(email)
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a member by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_id");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a profile patch. `None` fields are left untouched; changing
    /// phone or email resets the matching verified flag.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_profile(
        &self,
        id: Uuid,
        fullname: Option<&str>,
        email: Option<&str>,
        phone_number: Option<&str>,
        membercard_number: Option<&str>,
        signup_bias: Option<i32>,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_member_profile");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            UPDATE members SET
                fullname = COALESCE($2, fullname),
                email = COALESCE($3, email),
                email_verified = CASE
                    WHEN $3 IS NOT NULL AND $3 IS DISTINCT FROM email THEN FALSE
                    ELSE email_verified
                END,
                phone_number = COALESCE($4, phone_number),
                phone_verified = CASE
                    WHEN $4 IS NOT NULL AND $4 IS DISTINCT FROM phone_number THEN FALSE
                    ELSE phone_verified
                END,
                membercard_number = COALESCE($5, membercard_number),
                signup_bias = COALESCE($6, signup_bias),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(fullname)
        .bind(email)
        .bind(phone_number)
        .bind(membercard_number)
        .bind(signup_bias)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Store a freshly issued verification code for a channel.
    pub async fn set_verification_code(
        &self,
        id: Uuid,
        channel_is_phone: bool,
        code: &str,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_member_verification_code");
        let query = if channel_is_phone {
            format!(
                r#"
                UPDATE members
                SET phone_verification_code = $2, phone_verification_sent_at = NOW(),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {MEMBER_COLUMNS}
                "#,
            )
        } else {
            format!(
                r#"
                UPDATE members
                SET email_verification_code = $2, email_verification_sent_at = NOW(),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {MEMBER_COLUMNS}
                "#,
            )
        };
        let result = sqlx::query_as::<_, MemberEntity>(&query)
            .bind(id)
            .bind(code)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Mark a channel verified and clear its code.
    pub async fn mark_verified(
        &self,
        id: Uuid,
        channel_is_phone: bool,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_member_verified");
        let query = if channel_is_phone {
            format!(
                r#"
                UPDATE members
                SET phone_verified = TRUE, phone_verification_code = NULL,
                    phone_verification_sent_at = NULL, updated_at = NOW()
                WHERE id = $1
                RETURNING {MEMBER_COLUMNS}
                "#,
            )
        } else {
            format!(
                r#"
                UPDATE members
                SET email_verified = TRUE, email_verification_code = NULL,
                    email_verification_sent_at = NULL, updated_at = NOW()
                WHERE id = $1
                RETURNING {MEMBER_COLUMNS}
                "#,
            )
        };
        let result = sqlx::query_as::<_, MemberEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Members this member holds a proxy for.
    pub async fn list_proxies(&self, id: Uuid) -> Result<Vec<MemberBriefEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_member_proxies");
        let result = sqlx::query_as::<_, MemberBriefEntity>(
            r#"
            SELECT m.id, m.fullname
            FROM member_proxies mp
            JOIN members m ON m.id = mp.for_member_id
            WHERE mp.holder_id = $1
            ORDER BY m.fullname
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// True when `holder` may book activities on behalf of `target`.
    pub async fn holds_proxy_for(&self, holder: Uuid, target: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("member_holds_proxy_for");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM member_proxies
                WHERE holder_id = $1 AND for_member_id = $2
            )
            "#,
        )
        .bind(holder)
        .bind(target)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All of the member's assignments in events starting in `year`,
    /// including proxy-held ones, with their pending-delist markers. Feeds
    /// the eligibility evaluator.
    pub async fn assignments_for_year(
        &self,
        member_id: Uuid,
        year: i32,
    ) -> Result<Vec<AssignmentRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("member_assignments_for_year");
        let result = sqlx::query_as::<_, AssignmentRowEntity>(
            r#"
            SELECT a.id AS activity_id,
                   a.event_id,
                   CAST(EXTRACT(YEAR FROM e.start_date) AS INTEGER) AS event_year,
                   a.weight,
                   a.completed,
                   EXISTS (
                       SELECT 1 FROM activity_delist_requests adr
                       WHERE adr.activity_id = a.id AND adr.approved IS NULL
                   ) AS pending_delist
            FROM activities a
            JOIN events e ON e.id = a.event_id
            WHERE ((a.assigned_member_id = $1 AND a.assigned_for_proxy_id IS NULL)
                   OR a.assigned_for_proxy_id = $1)
              AND CAST(EXTRACT(YEAR FROM e.start_date) AS INTEGER) = $2
              AND NOT a.cancelled
            "#,
        )
        .bind(member_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
