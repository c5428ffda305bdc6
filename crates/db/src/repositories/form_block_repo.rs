//! Repository for the `form_blocks` table.

use formkit_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::form_block::{CreateFormBlock, FormBlock, UpdateFormBlock};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, uuid, form_id, parent_block, block_type, title, message, \
     is_required, is_disabled, position, options, created_at, updated_at";

/// Provides CRUD operations for the blocks of a form.
pub struct FormBlockRepo;

impl FormBlockRepo {
    /// Insert a new block, returning the created row.
    pub async fn create(
        pool: &PgPool,
        form_id: DbId,
        input: &CreateFormBlock,
    ) -> Result<FormBlock, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_in(&mut conn, form_id, input).await
    }

    /// Insert a new block inside the caller's transaction.
    ///
    /// If `uuid` is `None`, a random v4 identifier is assigned. `position`
    /// defaults to the end of the form.
    pub async fn create_in(
        conn: &mut PgConnection,
        form_id: DbId,
        input: &CreateFormBlock,
    ) -> Result<FormBlock, sqlx::Error> {
        let uuid = input
            .uuid
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let query = format!(
            "INSERT INTO form_blocks
                (uuid, form_id, parent_block, block_type, title, message,
                 is_required, is_disabled, position, options)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, false), COALESCE($8, false),
                     COALESCE($9, (SELECT COALESCE(MAX(position) + 1, 0)
                                   FROM form_blocks WHERE form_id = $2)),
                     $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormBlock>(&query)
            .bind(&uuid)
            .bind(form_id)
            .bind(&input.parent_block)
            .bind(&input.block_type)
            .bind(&input.title)
            .bind(&input.message)
            .bind(input.is_required)
            .bind(input.is_disabled)
            .bind(input.position)
            .bind(&input.options)
            .fetch_one(&mut *conn)
            .await
    }

    /// List all blocks of a form in presentation order.
    pub async fn list_by_form(pool: &PgPool, form_id: DbId) -> Result<Vec<FormBlock>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::list_by_form_in(&mut conn, form_id).await
    }

    /// List all blocks of a form inside the caller's transaction.
    pub async fn list_by_form_in(
        conn: &mut PgConnection,
        form_id: DbId,
    ) -> Result<Vec<FormBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_blocks WHERE form_id = $1 ORDER BY position ASC, id ASC"
        );
        sqlx::query_as::<_, FormBlock>(&query)
            .bind(form_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Internal ids of every block in a form.
    pub async fn list_ids_by_form(pool: &PgPool, form_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM form_blocks WHERE form_id = $1 ORDER BY id")
            .bind(form_id)
            .fetch_all(pool)
            .await
    }

    /// Find a block of a form by its identity.
    pub async fn find_by_uuid(
        pool: &PgPool,
        form_id: DbId,
        uuid: &str,
    ) -> Result<Option<FormBlock>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM form_blocks WHERE form_id = $1 AND uuid = $2");
        sqlx::query_as::<_, FormBlock>(&query)
            .bind(form_id)
            .bind(uuid)
            .fetch_optional(pool)
            .await
    }

    /// Find a block by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FormBlock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_blocks WHERE id = $1");
        sqlx::query_as::<_, FormBlock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a block. Only non-`None` fields in `input` are applied.
    /// `parent_block: Some(None)` detaches the block from its group.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFormBlock,
    ) -> Result<Option<FormBlock>, sqlx::Error> {
        let parent_given = input.parent_block.is_some();
        let parent = input.parent_block.as_ref().and_then(|p| p.as_deref());

        let query = format!(
            "UPDATE form_blocks SET
                parent_block = CASE WHEN $2 THEN $3 ELSE parent_block END,
                block_type = COALESCE($4, block_type),
                title = COALESCE($5, title),
                message = COALESCE($6, message),
                is_required = COALESCE($7, is_required),
                is_disabled = COALESCE($8, is_disabled),
                position = COALESCE($9, position),
                options = COALESCE($10, options)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormBlock>(&query)
            .bind(id)
            .bind(parent_given)
            .bind(parent)
            .bind(&input.block_type)
            .bind(&input.title)
            .bind(&input.message)
            .bind(input.is_required)
            .bind(input.is_disabled)
            .bind(input.position)
            .bind(&input.options)
            .fetch_optional(pool)
            .await
    }

    /// Delete a block by ID. Its interactions and responses cascade.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM form_blocks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every block of a form inside the caller's transaction.
    /// Returns the number of rows removed.
    pub async fn delete_by_form_in(
        conn: &mut PgConnection,
        form_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM form_blocks WHERE form_id = $1")
            .bind(form_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
