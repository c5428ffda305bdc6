//! Block interaction model and DTOs.
//!
//! Interactions hold the per-block logic configuration (buttons, choices,
//! jumps) that is copied along with a block when a template is applied.

use formkit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `form_block_interactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormBlockInteraction {
    pub id: DbId,
    pub uuid: String,
    pub form_block_id: DbId,
    pub interaction_type: String,
    pub label: Option<String>,
    pub reply: Option<String>,
    pub position: i32,
    pub is_disabled: bool,
    pub properties: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new interaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateFormBlockInteraction {
    pub uuid: Option<String>,
    pub interaction_type: String,
    pub label: Option<String>,
    pub reply: Option<String>,
    pub position: Option<i32>,
    pub is_disabled: Option<bool>,
    pub properties: Option<serde_json::Value>,
}
