//! Repository for the `forms` table.

use formkit_core::publication::PublicationFilter;
use formkit_core::short_id::ShortIdCodec;
use formkit_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::form::{CreateForm, Form, FormSettings, UpdateForm};
use crate::repositories::FormTemplateRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, uuid, user_id, team_id, name, \
     description, language, avatar_path, background_path, brand_color, text_color, \
     background_color, eoc_text, eoc_headline, data_retention_days, is_auto_delete_enabled, \
     legal_notice_link, privacy_link, cta_label, cta_link, cta_append_params, \
     cta_redirect_delay, use_cta_redirect, cta_append_session_id, linkedin, github, \
     instagram, facebook, twitter, show_cta_link, show_social_links, use_brighter_inputs, \
     show_form_progress, is_notification_via_mail, show_privacy_link, has_data_privacy, \
     published_at, deleted_at, created_at, updated_at";

/// SQL predicate for each publication filter.
fn filter_clause(filter: PublicationFilter) -> &'static str {
    match filter {
        PublicationFilter::Published => {
            "deleted_at IS NULL AND published_at IS NOT NULL AND published_at <= NOW()"
        }
        PublicationFilter::Unpublished => {
            "deleted_at IS NULL AND (published_at IS NULL OR published_at > NOW())"
        }
        PublicationFilter::Trashed => "deleted_at IS NOT NULL",
        PublicationFilter::All => "deleted_at IS NULL",
    }
}

/// Provides CRUD, publication and duplication operations for forms.
pub struct FormRepo;

impl FormRepo {
    // ── Creation ──────────────────────────────────────────────────────

    /// Insert a new form and assign its public identifier.
    pub async fn create(
        pool: &PgPool,
        input: &CreateForm,
        short_ids: &ShortIdCodec,
    ) -> Result<Form, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let form = Self::create_in(&mut tx, input, short_ids).await?;
        tx.commit().await?;
        Ok(form)
    }

    /// Insert a new form inside the caller's transaction.
    ///
    /// The row is first stored under a random token; once the sequential id
    /// is known the short public identifier derived from it replaces the
    /// token.
    pub async fn create_in(
        conn: &mut PgConnection,
        input: &CreateForm,
        short_ids: &ShortIdCodec,
    ) -> Result<Form, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO forms (uuid, user_id, team_id, name)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(input.user_id)
        .bind(input.team_id)
        .bind(&input.name)
        .fetch_one(&mut *conn)
        .await?;

        let public_id = short_ids.encode(id as u64);
        let query = format!("UPDATE forms SET uuid = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let form = sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .bind(&public_id)
            .fetch_one(&mut *conn)
            .await?;

        tracing::debug!(form_id = id, uuid = %public_id, "Assigned public form identifier");
        Ok(form)
    }

    // ── Lookup ────────────────────────────────────────────────────────

    /// Find a form by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a form by its public identifier. Excludes soft-deleted rows.
    pub async fn find_by_uuid(pool: &PgPool, uuid: &str) -> Result<Option<Form>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM forms WHERE uuid = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Form>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Find a form by its public identifier, including soft-deleted rows.
    pub async fn find_by_uuid_include_deleted(
        pool: &PgPool,
        uuid: &str,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE uuid = $1");
        sqlx::query_as::<_, Form>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Find a published, active form by its public identifier.
    pub async fn find_published_by_uuid(
        pool: &PgPool,
        uuid: &str,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM forms WHERE uuid = $1 AND {}",
            filter_clause(PublicationFilter::Published)
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// List a user's forms matching `filter`, most recently created first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: PublicationFilter,
    ) -> Result<Vec<Form>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM forms WHERE user_id = $1 AND {} ORDER BY created_at DESC, id DESC",
            filter_clause(filter)
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    // ── Updates ───────────────────────────────────────────────────────

    /// Update a form. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no active row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateForm,
    ) -> Result<Option<Form>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::update_in(&mut conn, id, input).await
    }

    /// [`FormRepo::update`] inside the caller's transaction.
    pub async fn update_in(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateForm,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET
                name = COALESCE($2, name),
                is_notification_via_mail = COALESCE($3, is_notification_via_mail),
                show_privacy_link = COALESCE($4, show_privacy_link),
                has_data_privacy = COALESCE($5, has_data_privacy)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.is_notification_via_mail)
            .bind(input.show_privacy_link)
            .bind(input.has_data_privacy)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Replace every settings column of a form.
    pub async fn update_settings(
        pool: &PgPool,
        id: DbId,
        settings: &FormSettings,
    ) -> Result<Option<Form>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::update_settings_in(&mut conn, id, settings).await
    }

    /// Replace every settings column of a form inside the caller's transaction.
    pub async fn update_settings_in(
        conn: &mut PgConnection,
        id: DbId,
        s: &FormSettings,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET
                description = $2, language = $3, avatar_path = $4, background_path = $5,
                brand_color = $6, text_color = $7, background_color = $8, eoc_text = $9,
                eoc_headline = $10, data_retention_days = $11, is_auto_delete_enabled = $12,
                legal_notice_link = $13, privacy_link = $14, cta_label = $15, cta_link = $16,
                cta_append_params = $17, cta_redirect_delay = $18, use_cta_redirect = $19,
                cta_append_session_id = $20, linkedin = $21, github = $22, instagram = $23,
                facebook = $24, twitter = $25, show_cta_link = $26, show_social_links = $27,
                use_brighter_inputs = $28, show_form_progress = $29
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .bind(&s.description)
            .bind(&s.language)
            .bind(&s.avatar_path)
            .bind(&s.background_path)
            .bind(&s.brand_color)
            .bind(&s.text_color)
            .bind(&s.background_color)
            .bind(&s.eoc_text)
            .bind(&s.eoc_headline)
            .bind(s.data_retention_days)
            .bind(s.is_auto_delete_enabled)
            .bind(&s.legal_notice_link)
            .bind(&s.privacy_link)
            .bind(&s.cta_label)
            .bind(&s.cta_link)
            .bind(s.cta_append_params)
            .bind(s.cta_redirect_delay)
            .bind(s.use_cta_redirect)
            .bind(s.cta_append_session_id)
            .bind(&s.linkedin)
            .bind(&s.github)
            .bind(&s.instagram)
            .bind(&s.facebook)
            .bind(&s.twitter)
            .bind(s.show_cta_link)
            .bind(s.show_social_links)
            .bind(s.use_brighter_inputs)
            .bind(s.show_form_progress)
            .fetch_optional(&mut *conn)
            .await
    }

    // ── Publication ───────────────────────────────────────────────────

    /// Publish a form as of now. Returns `None` if no active row exists.
    pub async fn publish(pool: &PgPool, id: DbId) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET published_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Clear a form's publication timestamp. Returns `None` if no active row exists.
    pub async fn unpublish(pool: &PgPool, id: DbId) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET published_at = NULL
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // ── Deletion ──────────────────────────────────────────────────────

    /// Soft-delete a form by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE forms SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted form. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE forms SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a form by ID. Blocks, interactions and sessions
    /// cascade. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Duplication ───────────────────────────────────────────────────

    /// Duplicate `source` into a new form called `new_name`.
    ///
    /// Only the owner and team are copied directly. Settings, blocks and
    /// interactions travel through a template exported from the source and
    /// applied to the new form, so every block gets a new identity. The
    /// whole operation is one transaction: either the form and its full
    /// block set exist afterwards, or nothing does.
    pub async fn duplicate(
        pool: &PgPool,
        source: &Form,
        new_name: &str,
        short_ids: &ShortIdCodec,
    ) -> Result<Form, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let created = Self::create_in(
            &mut tx,
            &CreateForm {
                user_id: source.user_id,
                team_id: source.team_id,
                name: new_name.to_string(),
            },
            short_ids,
        )
        .await?;

        let template = FormTemplateRepo::export_in(&mut tx, source).await?;
        FormTemplateRepo::apply_in(&mut tx, created.id, &template).await?;

        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1");
        let form = sqlx::query_as::<_, Form>(&query)
            .bind(created.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            source_id = source.id,
            form_id = form.id,
            blocks = template.blocks.len(),
            "Duplicated form"
        );
        Ok(form)
    }
}
