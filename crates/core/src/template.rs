//! Form template codec.
//!
//! A template is the portable shape of a form: an allow-listed set of
//! configuration attributes plus its block graph with block-level
//! interactions. Duplication exports a template from one form and applies
//! it to another, so this module is the single place that decides what is
//! copyable.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Current template format version.
pub const TEMPLATE_VERSION: u32 = 1;

/// Form attributes carried by a template.
///
/// Ownership, publication state, soft-deletion state and the public
/// identifier are deliberately absent.
pub const TEMPLATE_ATTRIBUTES: &[&str] = &[
    "description",
    "language",
    "avatar_path",
    "background_path",
    "brand_color",
    "text_color",
    "background_color",
    "eoc_text",
    "eoc_headline",
    "data_retention_days",
    "is_auto_delete_enabled",
    "legal_notice_link",
    "privacy_link",
    "cta_label",
    "cta_link",
    "cta_append_params",
    "cta_redirect_delay",
    "use_cta_redirect",
    "cta_append_session_id",
    "linkedin",
    "github",
    "instagram",
    "facebook",
    "twitter",
    "show_cta_link",
    "show_social_links",
    "use_brighter_inputs",
    "show_form_progress",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A portable snapshot of a form's configuration and block graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub version: u32,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub blocks: Vec<TemplateBlock>,
}

/// A block inside a template. `uuid` and `parent_block` refer to identities
/// local to the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBlock {
    pub uuid: String,
    pub parent_block: Option<String>,
    pub block_type: String,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub position: i32,
    pub options: Option<Value>,
    #[serde(default)]
    pub interactions: Vec<TemplateInteraction>,
}

/// Interaction / logic configuration attached to a template block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInteraction {
    pub uuid: String,
    pub interaction_type: String,
    pub label: Option<String>,
    pub reply: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub is_disabled: bool,
    pub properties: Option<Value>,
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Keep only allow-listed keys from a serialized settings object.
///
/// Non-object input yields an empty map.
pub fn pick_attributes(settings: &Value) -> Map<String, Value> {
    let Some(obj) = settings.as_object() else {
        return Map::new();
    };
    obj.iter()
        .filter(|(key, _)| TEMPLATE_ATTRIBUTES.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Fresh random identity for an imported block or interaction.
pub fn new_identity() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl FormTemplate {
    /// Build a template from serialized form settings and exported blocks.
    pub fn new(settings: &Value, blocks: Vec<TemplateBlock>) -> Self {
        Self {
            version: TEMPLATE_VERSION,
            attributes: pick_attributes(settings),
            blocks,
        }
    }

    /// Reject templates this codec cannot apply.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.version != TEMPLATE_VERSION {
            return Err(CoreError::Validation(format!(
                "Unsupported template version {}, expected {TEMPLATE_VERSION}",
                self.version
            )));
        }
        let mut seen = HashSet::new();
        for block in &self.blocks {
            if !seen.insert(block.uuid.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate block identity '{}' in template",
                    block.uuid
                )));
            }
        }
        Ok(())
    }

    /// Attributes restricted to the allow-list, whatever the template holds.
    pub fn allowed_attributes(&self) -> Value {
        Value::Object(pick_attributes(&Value::Object(self.attributes.clone())))
    }

    /// Produce the blocks to insert into a target form.
    ///
    /// Every block and interaction gets a new identity from `new_id`.
    /// Parent references are remapped to the new identities; references to
    /// blocks absent from the template are cleared. Blocks are returned
    /// parents-first so they can be inserted in order.
    pub fn instantiate(&self, mut new_id: impl FnMut() -> String) -> Vec<TemplateBlock> {
        let mapping: HashMap<&str, String> = self
            .blocks
            .iter()
            .map(|b| (b.uuid.as_str(), new_id()))
            .collect();

        let mut blocks: Vec<TemplateBlock> = self
            .blocks
            .iter()
            .map(|block| TemplateBlock {
                uuid: mapping[block.uuid.as_str()].clone(),
                parent_block: block
                    .parent_block
                    .as_deref()
                    .and_then(|p| mapping.get(p).cloned()),
                interactions: block
                    .interactions
                    .iter()
                    .map(|i| TemplateInteraction {
                        uuid: new_id(),
                        ..i.clone()
                    })
                    .collect(),
                ..block.clone()
            })
            .collect();

        blocks.sort_by_key(|b| b.parent_block.is_some());
        blocks
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn block(uuid: &str, parent: Option<&str>, kind: &str) -> TemplateBlock {
        TemplateBlock {
            uuid: uuid.to_string(),
            parent_block: parent.map(str::to_string),
            block_type: kind.to_string(),
            title: Some(format!("title {uuid}")),
            message: None,
            is_required: false,
            is_disabled: false,
            position: 0,
            options: None,
            interactions: vec![TemplateInteraction {
                uuid: format!("{uuid}-i"),
                interaction_type: "button".to_string(),
                label: Some("Next".to_string()),
                reply: None,
                position: 0,
                is_disabled: false,
                properties: None,
            }],
        }
    }

    fn counter() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("new-{n}")
        }
    }

    #[test]
    fn pick_attributes_drops_non_allowed_keys() {
        let settings = serde_json::json!({
            "brand_color": "#ff0000",
            "user_id": 7,
            "published_at": "2024-01-01T00:00:00Z",
            "uuid": "abc",
            "show_cta_link": true
        });
        let picked = pick_attributes(&settings);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked["brand_color"], "#ff0000");
        assert_eq!(picked["show_cta_link"], true);
    }

    #[test]
    fn pick_attributes_of_non_object_is_empty() {
        assert!(pick_attributes(&Value::Null).is_empty());
    }

    #[test]
    fn instantiate_assigns_new_identities_and_remaps_parents() {
        let template = FormTemplate::new(
            &Value::Null,
            vec![
                block("c1", Some("g"), "text"),
                block("g", None, "group"),
                block("c2", Some("g"), "text"),
            ],
        );
        let blocks = template.instantiate(counter());

        assert_eq!(blocks.len(), 3);
        let group = blocks.iter().find(|b| b.block_type == "group").unwrap();
        assert!(!["g", "c1", "c2"].contains(&group.uuid.as_str()));
        assert_eq!(blocks[0].uuid, group.uuid, "parents come first");

        let children: Vec<_> = blocks.iter().filter(|b| b.parent_block.is_some()).collect();
        assert_eq!(children.len(), 2);
        for c in children {
            assert_eq!(c.parent_block.as_deref(), Some(group.uuid.as_str()));
            assert!(!c.interactions[0].uuid.ends_with("-i"));
        }
    }

    #[test]
    fn instantiate_clears_dangling_parents() {
        let template = FormTemplate::new(&Value::Null, vec![block("a", Some("ghost"), "text")]);
        let blocks = template.instantiate(counter());
        assert_eq!(blocks[0].parent_block, None);
    }

    #[test]
    fn instantiate_keeps_configuration() {
        let mut b = block("a", None, "text");
        b.is_disabled = true;
        b.position = 4;
        b.options = Some(serde_json::json!({"placeholder": "Name"}));
        let blocks = FormTemplate::new(&Value::Null, vec![b]).instantiate(counter());
        assert!(blocks[0].is_disabled);
        assert_eq!(blocks[0].position, 4);
        assert_eq!(blocks[0].options.as_ref().unwrap()["placeholder"], "Name");
    }

    #[test]
    fn validate_rejects_unknown_version() {
        let mut template = FormTemplate::new(&Value::Null, vec![]);
        template.version = 99;
        assert!(template.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_block_identities() {
        let template = FormTemplate::new(
            &Value::Null,
            vec![block("a", None, "text"), block("a", None, "text")],
        );
        assert!(template.validate().is_err());
    }

    #[test]
    fn allowed_attributes_filters_imported_keys() {
        let json = serde_json::json!({
            "version": TEMPLATE_VERSION,
            "attributes": { "brand_color": "#000000", "user_id": 3 }
        });
        let template: FormTemplate = serde_json::from_value(json).unwrap();
        assert!(template.validate().is_ok());
        let attrs = template.allowed_attributes();
        assert_eq!(attrs["brand_color"], "#000000");
        assert!(attrs.get("user_id").is_none());
        assert!(template.blocks.is_empty());
    }
}
