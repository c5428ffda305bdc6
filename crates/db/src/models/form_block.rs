//! Form block entity model and DTOs.

use formkit_core::storyboard::StoryboardBlock;
use formkit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `form_blocks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormBlock {
    pub id: DbId,
    /// Identity of the block within its form.
    pub uuid: String,
    pub form_id: DbId,
    /// `uuid` of the group this block belongs to.
    pub parent_block: Option<String>,
    pub block_type: String,
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_required: bool,
    pub is_disabled: bool,
    pub position: i32,
    pub options: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StoryboardBlock for FormBlock {
    fn block_uuid(&self) -> &str {
        &self.uuid
    }

    fn parent_block(&self) -> Option<&str> {
        self.parent_block.as_deref()
    }

    fn block_type(&self) -> &str {
        &self.block_type
    }

    fn is_disabled(&self) -> bool {
        self.is_disabled
    }

    fn position(&self) -> i32 {
        self.position
    }
}

/// DTO for creating a new block. A random `uuid` is assigned when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateFormBlock {
    pub uuid: Option<String>,
    pub parent_block: Option<String>,
    pub block_type: String,
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_required: Option<bool>,
    pub is_disabled: Option<bool>,
    pub position: Option<i32>,
    pub options: Option<serde_json::Value>,
}

/// DTO for updating an existing block. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFormBlock {
    /// Absent keeps the group. `null` moves the block back to the top level.
    #[serde(default, deserialize_with = "present_or_null")]
    pub parent_block: Option<Option<String>>,
    pub block_type: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_required: Option<bool>,
    pub is_disabled: Option<bool>,
    pub position: Option<i32>,
    pub options: Option<serde_json::Value>,
}

/// Wraps any present value, `null` included, in `Some`, so a missing key
/// stays `None` under `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> UpdateFormBlock {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn missing_parent_keeps_group() {
        assert_eq!(parse(serde_json::json!({ "title": "Hi" })).parent_block, None);
    }

    #[test]
    fn null_parent_detaches() {
        assert_eq!(
            parse(serde_json::json!({ "parent_block": null })).parent_block,
            Some(None)
        );
    }

    #[test]
    fn string_parent_moves_into_group() {
        assert_eq!(
            parse(serde_json::json!({ "parent_block": "group-1" })).parent_block,
            Some(Some("group-1".to_string()))
        );
    }
}
