//! Repository for visitor sessions and their responses.
//!
//! The counting queries mirror `formkit_core::sessions`: a session belongs
//! to a form when at least one of its responses answers one of the form's
//! blocks.

use formkit_core::sessions::{ResponseEvent, SessionMetrics};
use formkit_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::form_session::{
    CreateFormSessionResponse, FormSession, FormSessionResponse, SessionCounts,
};

/// Column list for `form_sessions`.
const SESSION_COLUMNS: &str = "id, form_id, session, is_completed, params, created_at, updated_at";

/// Column list for `form_session_responses`.
const RESPONSE_COLUMNS: &str = "id, session, form_block_id, value, created_at, updated_at";

/// Provides session lifecycle and counting operations.
pub struct FormSessionRepo;

impl FormSessionRepo {
    // ── Lifecycle ─────────────────────────────────────────────────────

    /// Open a new session for a form under a random token.
    pub async fn start(
        pool: &PgPool,
        form_id: DbId,
        params: Option<&serde_json::Value>,
    ) -> Result<FormSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_sessions (form_id, session, params)
             VALUES ($1, $2, $3)
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, FormSession>(&query)
            .bind(form_id)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(params)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its token.
    pub async fn find_by_session(
        pool: &PgPool,
        session: &str,
    ) -> Result<Option<FormSession>, sqlx::Error> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM form_sessions WHERE session = $1");
        sqlx::query_as::<_, FormSession>(&query)
            .bind(session)
            .fetch_optional(pool)
            .await
    }

    /// Record one answer within a session.
    pub async fn record_response(
        pool: &PgPool,
        input: &CreateFormSessionResponse,
    ) -> Result<FormSessionResponse, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_session_responses (session, form_block_id, value)
             VALUES ($1, $2, $3)
             RETURNING {RESPONSE_COLUMNS}"
        );
        sqlx::query_as::<_, FormSessionResponse>(&query)
            .bind(&input.session)
            .bind(input.form_block_id)
            .bind(&input.value)
            .fetch_one(pool)
            .await
    }

    /// Mark a session completed. Returns `None` if the token is unknown.
    pub async fn complete(
        pool: &PgPool,
        session: &str,
    ) -> Result<Option<FormSession>, sqlx::Error> {
        let query = format!(
            "UPDATE form_sessions SET is_completed = true
             WHERE session = $1
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, FormSession>(&query)
            .bind(session)
            .fetch_optional(pool)
            .await
    }

    // ── Counting ──────────────────────────────────────────────────────

    /// Distinct sessions with at least one response on `block_ids`.
    pub async fn count_distinct_sessions(
        pool: &PgPool,
        block_ids: &[DbId],
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(DISTINCT session) FROM form_session_responses
             WHERE form_block_id = ANY($1)",
        )
        .bind(block_ids)
        .fetch_one(pool)
        .await
    }

    /// Among sessions with a response on `block_ids`, those flagged completed.
    pub async fn count_completed_sessions(
        pool: &PgPool,
        block_ids: &[DbId],
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM form_sessions s
             WHERE s.is_completed
               AND EXISTS (
                   SELECT 1 FROM form_session_responses r
                   WHERE r.session = s.session AND r.form_block_id = ANY($1)
               )",
        )
        .bind(block_ids)
        .fetch_one(pool)
        .await
    }

    /// Distinct sessions whose responses on `block_ids` fall in the UTC
    /// calendar month of `now`.
    pub async fn count_sessions_in_month(
        pool: &PgPool,
        block_ids: &[DbId],
        now: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(DISTINCT session) FROM form_session_responses
             WHERE form_block_id = ANY($1)
               AND date_trunc('month', created_at AT TIME ZONE 'UTC')
                 = date_trunc('month', $2::timestamptz AT TIME ZONE 'UTC')",
        )
        .bind(block_ids)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// All three counts for a form's blocks.
    pub async fn counts(
        pool: &PgPool,
        block_ids: &[DbId],
        now: Timestamp,
    ) -> Result<SessionCounts, sqlx::Error> {
        Ok(SessionCounts {
            total_sessions: Self::count_distinct_sessions(pool, block_ids).await?,
            completed_sessions: Self::count_completed_sessions(pool, block_ids).await?,
            sessions_this_month: Self::count_sessions_in_month(pool, block_ids, now).await?,
        })
    }

    /// Session metrics with the derived completion rate.
    pub async fn metrics(pool: &PgPool, block_ids: &[DbId]) -> Result<SessionMetrics, sqlx::Error> {
        let total = Self::count_distinct_sessions(pool, block_ids).await?;
        let completed = Self::count_completed_sessions(pool, block_ids).await?;
        Ok(SessionMetrics::from_counts(total, completed))
    }

    /// Raw response events on `block_ids`, oldest first.
    pub async fn list_response_events(
        pool: &PgPool,
        block_ids: &[DbId],
    ) -> Result<Vec<ResponseEvent>, sqlx::Error> {
        let rows: Vec<(String, DbId, bool, Timestamp)> = sqlx::query_as(
            "SELECT r.session, r.form_block_id, s.is_completed, r.created_at
             FROM form_session_responses r
             JOIN form_sessions s ON s.session = r.session
             WHERE r.form_block_id = ANY($1)
             ORDER BY r.created_at ASC, r.id ASC",
        )
        .bind(block_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(session, block_id, session_completed, created_at)| ResponseEvent {
                session,
                block_id,
                session_completed,
                created_at,
            })
            .collect())
    }
}
