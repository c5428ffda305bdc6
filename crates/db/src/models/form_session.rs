//! Visitor session and response models.

use formkit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `form_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormSession {
    pub id: DbId,
    pub form_id: DbId,
    /// Opaque visitor token shared by all responses of the session.
    pub session: String,
    pub is_completed: bool,
    pub params: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `form_session_responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormSessionResponse {
    pub id: DbId,
    pub session: String,
    pub form_block_id: DbId,
    pub value: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFormSessionResponse {
    pub session: String,
    pub form_block_id: DbId,
    pub value: Option<serde_json::Value>,
}

/// Session counts for a single form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionCounts {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub sessions_this_month: i64,
}
