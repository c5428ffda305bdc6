//! Repository for the `form_block_interactions` table.

use formkit_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::form_block_interaction::{CreateFormBlockInteraction, FormBlockInteraction};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, uuid, form_block_id, interaction_type, label, reply, \
     position, is_disabled, properties, created_at, updated_at";

/// Provides create and list operations for block interactions.
pub struct FormBlockInteractionRepo;

impl FormBlockInteractionRepo {
    /// Insert a new interaction, returning the created row.
    pub async fn create(
        pool: &PgPool,
        form_block_id: DbId,
        input: &CreateFormBlockInteraction,
    ) -> Result<FormBlockInteraction, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_in(&mut conn, form_block_id, input).await
    }

    /// Insert a new interaction inside the caller's transaction.
    pub async fn create_in(
        conn: &mut PgConnection,
        form_block_id: DbId,
        input: &CreateFormBlockInteraction,
    ) -> Result<FormBlockInteraction, sqlx::Error> {
        let uuid = input
            .uuid
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let query = format!(
            "INSERT INTO form_block_interactions
                (uuid, form_block_id, interaction_type, label, reply, position, is_disabled, properties)
             VALUES ($1, $2, $3, $4, $5,
                     COALESCE($6, (SELECT COALESCE(MAX(position) + 1, 0)
                                   FROM form_block_interactions WHERE form_block_id = $2)),
                     COALESCE($7, false), $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormBlockInteraction>(&query)
            .bind(&uuid)
            .bind(form_block_id)
            .bind(&input.interaction_type)
            .bind(&input.label)
            .bind(&input.reply)
            .bind(input.position)
            .bind(input.is_disabled)
            .bind(&input.properties)
            .fetch_one(&mut *conn)
            .await
    }

    /// List the interactions of one block in order.
    pub async fn list_by_block(
        pool: &PgPool,
        form_block_id: DbId,
    ) -> Result<Vec<FormBlockInteraction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_block_interactions
             WHERE form_block_id = $1
             ORDER BY position ASC, id ASC"
        );
        sqlx::query_as::<_, FormBlockInteraction>(&query)
            .bind(form_block_id)
            .fetch_all(pool)
            .await
    }

    /// List the interactions of every block in a form, grouped by block.
    pub async fn list_by_form(
        pool: &PgPool,
        form_id: DbId,
    ) -> Result<Vec<FormBlockInteraction>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::list_by_form_in(&mut conn, form_id).await
    }

    /// List the interactions of every block in a form inside the caller's
    /// transaction, grouped by block.
    pub async fn list_by_form_in(
        conn: &mut PgConnection,
        form_id: DbId,
    ) -> Result<Vec<FormBlockInteraction>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM form_block_interactions i
             JOIN form_blocks b ON b.id = i.form_block_id
             WHERE b.form_id = $1
             ORDER BY i.form_block_id ASC, i.position ASC, i.id ASC",
            qualified_columns("i")
        );
        sqlx::query_as::<_, FormBlockInteraction>(&query)
            .bind(form_id)
            .fetch_all(&mut *conn)
            .await
    }
}

/// `COLUMNS` with every column prefixed by a table alias.
fn qualified_columns(alias: &str) -> String {
    COLUMNS
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
