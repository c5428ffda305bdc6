//! Exports a form as a portable template and applies templates to forms.
//!
//! A template carries the allow-listed settings plus every block with its
//! interactions. Applying one replaces the target's settings and blocks.

use std::collections::HashMap;

use formkit_core::template::{new_identity, FormTemplate, TemplateBlock, TemplateInteraction};
use formkit_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::form::{Form, FormSettings};
use crate::models::form_block::CreateFormBlock;
use crate::models::form_block_interaction::CreateFormBlockInteraction;
use crate::repositories::{FormBlockInteractionRepo, FormBlockRepo, FormRepo};

/// Provides template export and import for forms.
pub struct FormTemplateRepo;

impl FormTemplateRepo {
    /// Export `form` as a template.
    pub async fn export(pool: &PgPool, form: &Form) -> Result<FormTemplate, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::export_in(&mut conn, form).await
    }

    /// Export `form` as a template inside the caller's transaction.
    pub async fn export_in(
        conn: &mut PgConnection,
        form: &Form,
    ) -> Result<FormTemplate, sqlx::Error> {
        let settings = serde_json::to_value(&form.settings)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let blocks = FormBlockRepo::list_by_form_in(conn, form.id).await?;
        let interactions = FormBlockInteractionRepo::list_by_form_in(conn, form.id).await?;

        let mut by_block: HashMap<DbId, Vec<TemplateInteraction>> = HashMap::new();
        for i in interactions {
            by_block
                .entry(i.form_block_id)
                .or_default()
                .push(TemplateInteraction {
                    uuid: i.uuid,
                    interaction_type: i.interaction_type,
                    label: i.label,
                    reply: i.reply,
                    position: i.position,
                    is_disabled: i.is_disabled,
                    properties: i.properties,
                });
        }

        let blocks = blocks
            .into_iter()
            .map(|b| TemplateBlock {
                interactions: by_block.remove(&b.id).unwrap_or_default(),
                uuid: b.uuid,
                parent_block: b.parent_block,
                block_type: b.block_type,
                title: b.title,
                message: b.message,
                is_required: b.is_required,
                is_disabled: b.is_disabled,
                position: b.position,
                options: b.options,
            })
            .collect();

        Ok(FormTemplate::new(&settings, blocks))
    }

    /// Apply `template` to the form with `form_id` in a single transaction.
    ///
    /// Returns the number of blocks created.
    pub async fn apply(
        pool: &PgPool,
        form_id: DbId,
        template: &FormTemplate,
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let created = Self::apply_in(&mut tx, form_id, template).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Apply `template` inside the caller's transaction.
    ///
    /// Settings are overwritten with the template's allow-listed attributes
    /// (missing ones fall back to column defaults). Existing blocks are
    /// removed and the template's blocks are inserted under new identities.
    /// Callers are expected to have validated the template.
    pub async fn apply_in(
        conn: &mut PgConnection,
        form_id: DbId,
        template: &FormTemplate,
    ) -> Result<usize, sqlx::Error> {
        let settings: FormSettings = serde_json::from_value(template.allowed_attributes())
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        if FormRepo::update_settings_in(conn, form_id, &settings)
            .await?
            .is_none()
        {
            return Err(sqlx::Error::RowNotFound);
        }

        let removed = FormBlockRepo::delete_by_form_in(conn, form_id).await?;

        let blocks = template.instantiate(new_identity);
        for block in &blocks {
            let created = FormBlockRepo::create_in(
                conn,
                form_id,
                &CreateFormBlock {
                    uuid: Some(block.uuid.clone()),
                    parent_block: block.parent_block.clone(),
                    block_type: block.block_type.clone(),
                    title: block.title.clone(),
                    message: block.message.clone(),
                    is_required: Some(block.is_required),
                    is_disabled: Some(block.is_disabled),
                    position: Some(block.position),
                    options: block.options.clone(),
                },
            )
            .await?;

            for interaction in &block.interactions {
                FormBlockInteractionRepo::create_in(
                    conn,
                    created.id,
                    &CreateFormBlockInteraction {
                        uuid: Some(interaction.uuid.clone()),
                        interaction_type: interaction.interaction_type.clone(),
                        label: interaction.label.clone(),
                        reply: interaction.reply.clone(),
                        position: Some(interaction.position),
                        is_disabled: Some(interaction.is_disabled),
                        properties: interaction.properties.clone(),
                    },
                )
                .await?;
            }
        }

        tracing::debug!(
            form_id,
            removed,
            created = blocks.len(),
            "Applied form template"
        );
        Ok(blocks.len())
    }
}
