//! Form entity model and DTOs.

use formkit_core::presentation::{self, DEFAULT_BRAND_COLOR};
use formkit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Styling and behaviour settings of a form.
///
/// These are exactly the columns a template carries from one form to
/// another. Missing keys deserialize to the column defaults.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub description: Option<String>,
    pub language: String,
    pub avatar_path: Option<String>,
    pub background_path: Option<String>,
    pub brand_color: Option<String>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub eoc_text: Option<String>,
    pub eoc_headline: Option<String>,
    pub data_retention_days: Option<i32>,
    pub is_auto_delete_enabled: bool,
    pub legal_notice_link: Option<String>,
    pub privacy_link: Option<String>,
    pub cta_label: Option<String>,
    pub cta_link: Option<String>,
    pub cta_append_params: bool,
    pub cta_redirect_delay: i32,
    pub use_cta_redirect: bool,
    pub cta_append_session_id: bool,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub show_cta_link: bool,
    pub show_social_links: bool,
    pub use_brighter_inputs: bool,
    pub show_form_progress: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            description: None,
            language: "en".to_string(),
            avatar_path: None,
            background_path: None,
            brand_color: Some(DEFAULT_BRAND_COLOR.to_string()),
            text_color: None,
            background_color: None,
            eoc_text: None,
            eoc_headline: None,
            data_retention_days: None,
            is_auto_delete_enabled: false,
            legal_notice_link: None,
            privacy_link: None,
            cta_label: None,
            cta_link: None,
            cta_append_params: false,
            cta_redirect_delay: 0,
            use_cta_redirect: false,
            cta_append_session_id: false,
            linkedin: None,
            github: None,
            instagram: None,
            facebook: None,
            twitter: None,
            show_cta_link: false,
            show_social_links: false,
            use_brighter_inputs: false,
            show_form_progress: false,
        }
    }
}

/// A form row from the `forms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Form {
    pub id: DbId,
    /// Public identifier, derived from `id` right after insert.
    pub uuid: String,
    pub user_id: DbId,
    pub team_id: Option<DbId>,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub settings: FormSettings,
    pub is_notification_via_mail: bool,
    pub show_privacy_link: bool,
    pub has_data_privacy: bool,
    pub published_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Form {
    pub fn is_published(&self, now: Timestamp) -> bool {
        presentation::is_published(self.published_at, now)
    }

    pub fn is_trashed(&self, now: Timestamp) -> bool {
        presentation::is_trashed(self.deleted_at, now)
    }

    pub fn brand_color(&self) -> &str {
        presentation::brand_color(self.settings.brand_color.as_deref())
    }

    pub fn contrast_color(&self) -> &'static str {
        presentation::contrast_color(self.brand_color())
    }

    pub fn initials(&self) -> String {
        presentation::initials(&self.name)
    }

    pub fn is_owner(&self, acting_user: Option<DbId>) -> bool {
        presentation::is_owner(self.user_id, acting_user)
    }
}

/// DTO for creating a new form. Settings start at their column defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateForm {
    pub user_id: DbId,
    pub team_id: Option<DbId>,
    pub name: String,
}

/// DTO for updating an existing form. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateForm {
    pub name: Option<String>,
    pub is_notification_via_mail: Option<bool>,
    pub show_privacy_link: Option<bool>,
    pub has_data_privacy: Option<bool>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use formkit_core::template::TEMPLATE_ATTRIBUTES;

    use super::*;

    #[test]
    fn settings_serialize_exactly_the_template_attributes() {
        let value = serde_json::to_value(FormSettings::default()).unwrap();
        let keys: BTreeSet<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let allowed: BTreeSet<&str> = TEMPLATE_ATTRIBUTES.iter().copied().collect();
        assert_eq!(keys, allowed);
    }

    #[test]
    fn missing_settings_keys_take_defaults() {
        let settings: FormSettings =
            serde_json::from_value(serde_json::json!({ "cta_label": "Go" })).unwrap();
        assert_eq!(settings.cta_label.as_deref(), Some("Go"));
        assert_eq!(settings.language, "en");
        assert_eq!(settings.brand_color.as_deref(), Some(DEFAULT_BRAND_COLOR));
    }
}
