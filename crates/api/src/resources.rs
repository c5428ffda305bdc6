//! Computed views returned by the HTTP layer.
//!
//! Derived attributes (asset URLs, contrast colour, initials, publication
//! state, owner fallbacks, session metrics) are computed here on every
//! request from the stored rows and never persisted.

use std::collections::HashMap;

use formkit_core::assets::{asset_url, AssetStore};
use formkit_core::presentation::active_link;
use formkit_core::sessions::completion_rate;
use formkit_core::storyboard::{self, Storyboard};
use formkit_core::types::{DbId, Timestamp};
use formkit_db::models::form::{Form, FormSettings};
use formkit_db::models::form_block::FormBlock;
use formkit_db::models::form_block_interaction::FormBlockInteraction;
use formkit_db::models::form_session::SessionCounts;
use formkit_db::models::user::User;
use serde::Serialize;

/// Services needed to compute presentation values.
#[derive(Clone, Copy)]
pub struct PresentationContext<'a> {
    pub app_url: &'a str,
    pub assets: &'a dyn AssetStore,
    pub now: Timestamp,
}

// ---------------------------------------------------------------------------
// Owner-derived values
// ---------------------------------------------------------------------------

/// Company and privacy values, falling back to the owner's defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OwnerDetails {
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub active_privacy_link: Option<String>,
    pub active_legal_notice_link: Option<String>,
    pub privacy_contact_person: Option<String>,
    pub privacy_contact_email: Option<String>,
}

impl OwnerDetails {
    pub fn new(settings: &FormSettings, owner: Option<&User>) -> Self {
        Self {
            company_name: owner.and_then(|u| u.company_name.clone()),
            company_description: owner.and_then(|u| u.company_description.clone()),
            active_privacy_link: active_link(
                settings.privacy_link.clone(),
                owner.and_then(|u| u.privacy_link.clone()),
            ),
            active_legal_notice_link: active_link(
                settings.legal_notice_link.clone(),
                owner.and_then(|u| u.legal_notice_link.clone()),
            ),
            privacy_contact_person: owner.and_then(|u| u.privacy_contact_person.clone()),
            privacy_contact_email: owner.and_then(|u| u.privacy_contact_email.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Session metrics of a form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormMetrics {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub completion_rate: f64,
    pub sessions_this_month: i64,
}

impl From<SessionCounts> for FormMetrics {
    fn from(counts: SessionCounts) -> Self {
        Self {
            total_sessions: counts.total_sessions,
            completed_sessions: counts.completed_sessions,
            completion_rate: completion_rate(counts.total_sessions, counts.completed_sessions),
            sessions_this_month: counts.sessions_this_month,
        }
    }
}

// ---------------------------------------------------------------------------
// Owner view
// ---------------------------------------------------------------------------

/// A form as seen by its owner.
#[derive(Debug, Serialize)]
pub struct FormResource {
    #[serde(flatten)]
    pub form: Form,
    pub avatar: Option<String>,
    pub background: Option<String>,
    pub contrast_color: &'static str,
    pub initials: String,
    pub is_published: bool,
    pub is_trashed: bool,
    pub blocks_count: usize,
    #[serde(flatten)]
    pub owner: OwnerDetails,
    pub metrics: FormMetrics,
}

impl FormResource {
    pub fn build(
        form: Form,
        owner: Option<&User>,
        blocks_count: usize,
        metrics: FormMetrics,
        ctx: PresentationContext<'_>,
    ) -> Self {
        Self {
            avatar: asset_url(ctx.app_url, ctx.assets, form.settings.avatar_path.as_deref()),
            background: asset_url(
                ctx.app_url,
                ctx.assets,
                form.settings.background_path.as_deref(),
            ),
            contrast_color: form.contrast_color(),
            initials: form.initials(),
            is_published: form.is_published(ctx.now),
            is_trashed: form.is_trashed(ctx.now),
            blocks_count,
            owner: OwnerDetails::new(&form.settings, owner),
            metrics,
            form,
        }
    }
}

/// A form in a listing. Metrics are left out to keep listings cheap.
#[derive(Debug, Serialize)]
pub struct FormSummary {
    pub uuid: String,
    pub name: String,
    pub brand_color: String,
    pub contrast_color: &'static str,
    pub initials: String,
    pub is_published: bool,
    pub is_trashed: bool,
    pub created_at: Timestamp,
}

impl FormSummary {
    pub fn build(form: &Form, now: Timestamp) -> Self {
        Self {
            uuid: form.uuid.clone(),
            name: form.name.clone(),
            brand_color: form.brand_color().to_string(),
            contrast_color: form.contrast_color(),
            initials: form.initials(),
            is_published: form.is_published(now),
            is_trashed: form.is_trashed(now),
            created_at: form.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Public view
// ---------------------------------------------------------------------------

/// An interaction as shown to visitors.
#[derive(Debug, Clone, Serialize)]
pub struct PublicInteraction {
    pub uuid: String,
    pub interaction_type: String,
    pub label: Option<String>,
    pub reply: Option<String>,
    pub position: i32,
    pub is_disabled: bool,
    pub properties: Option<serde_json::Value>,
}

/// A storyboard block as shown to visitors.
#[derive(Debug, Clone, Serialize)]
pub struct PublicBlock {
    pub id: DbId,
    pub uuid: String,
    pub parent_block: Option<String>,
    pub block_type: String,
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_required: bool,
    pub position: i32,
    pub options: Option<serde_json::Value>,
    pub interactions: Vec<PublicInteraction>,
}

/// Resolve the visitor storyboard and attach each block's interactions.
pub fn public_storyboard(
    blocks: &[FormBlock],
    interactions: Vec<FormBlockInteraction>,
) -> Storyboard<PublicBlock> {
    let mut by_block: HashMap<DbId, Vec<PublicInteraction>> = HashMap::new();
    for i in interactions {
        by_block
            .entry(i.form_block_id)
            .or_default()
            .push(PublicInteraction {
                uuid: i.uuid,
                interaction_type: i.interaction_type,
                label: i.label,
                reply: i.reply,
                position: i.position,
                is_disabled: i.is_disabled,
                properties: i.properties,
            });
    }

    storyboard::resolve(blocks).map(|b| PublicBlock {
        interactions: by_block.remove(&b.id).unwrap_or_default(),
        id: b.id,
        uuid: b.uuid,
        parent_block: b.parent_block,
        block_type: b.block_type,
        title: b.title,
        message: b.message,
        is_required: b.is_required,
        position: b.position,
        options: b.options,
    })
}

/// A published form as seen by visitors.
#[derive(Debug, Serialize)]
pub struct PublicFormResource {
    pub uuid: String,
    pub name: String,
    #[serde(flatten)]
    pub settings: FormSettings,
    pub avatar: Option<String>,
    pub background: Option<String>,
    pub contrast_color: &'static str,
    pub show_privacy_link: bool,
    pub has_data_privacy: bool,
    #[serde(flatten)]
    pub owner: OwnerDetails,
    pub storyboard: Storyboard<PublicBlock>,
}

impl PublicFormResource {
    pub fn build(
        form: Form,
        owner: Option<&User>,
        storyboard: Storyboard<PublicBlock>,
        ctx: PresentationContext<'_>,
    ) -> Self {
        Self {
            avatar: asset_url(ctx.app_url, ctx.assets, form.settings.avatar_path.as_deref()),
            background: asset_url(
                ctx.app_url,
                ctx.assets,
                form.settings.background_path.as_deref(),
            ),
            contrast_color: form.contrast_color(),
            show_privacy_link: form.show_privacy_link,
            has_data_privacy: form.has_data_privacy,
            owner: OwnerDetails::new(&form.settings, owner),
            uuid: form.uuid,
            name: form.name,
            settings: form.settings,
            storyboard,
        }
    }

    /// JavaScript snippet that exposes this resource as `window.iptSettings`.
    pub fn javascript_config(&self) -> Result<String, serde_json::Error> {
        let settings = serde_json::to_string(self)?;
        Ok(format!(
            "window.iptSettings = window.iptSettings || [];window.iptSettings = {settings}"
        ))
    }
}
