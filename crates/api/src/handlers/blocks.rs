//! Handlers for the blocks of a form (`/forms/{uuid}/blocks`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use formkit_core::error::CoreError;
use formkit_db::models::form::Form;
use formkit_db::models::form_block::{CreateFormBlock, FormBlock, UpdateFormBlock};
use formkit_db::repositories::FormBlockRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::forms::find_owned_form;
use crate::middleware::auth::AuthUser;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// Load a block of `form` by its identity.
pub(crate) async fn find_block(state: &AppState, form: &Form, block: &str) -> AppResult<FormBlock> {
    FormBlockRepo::find_by_uuid(&state.pool, form.id, block)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::missing("FormBlock", block)))
}

fn require_block_type(block_type: &str) -> AppResult<()> {
    if block_type.trim().is_empty() {
        return Err(AppError::BadRequest("block_type must not be empty".into()));
    }
    Ok(())
}

/// GET /api/v1/forms/{uuid}/blocks
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<Vec<FormBlock>>>> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    let blocks = FormBlockRepo::list_by_form(&state.pool, form.id).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// POST /api/v1/forms/{uuid}/blocks
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(input): Json<CreateFormBlock>,
) -> AppResult<Created<FormBlock>> {
    require_block_type(&input.block_type)?;
    let form = find_owned_form(&state, &uuid, &user).await?;

    let block = FormBlockRepo::create(&state.pool, form.id, &input).await?;
    tracing::debug!(form_id = form.id, block = %block.uuid, "Created block");
    Ok(created(block))
}

/// PUT /api/v1/forms/{uuid}/blocks/{block}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path((uuid, block)): Path<(String, String)>,
    Json(input): Json<UpdateFormBlock>,
) -> AppResult<Json<DataResponse<FormBlock>>> {
    if let Some(block_type) = &input.block_type {
        require_block_type(block_type)?;
    }
    let form = find_owned_form(&state, &uuid, &user).await?;
    let existing = find_block(&state, &form, &block).await?;

    let updated = FormBlockRepo::update(&state.pool, existing.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FormBlock",
            id: existing.id,
        }))?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/forms/{uuid}/blocks/{block}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path((uuid, block)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    let existing = find_block(&state, &form, &block).await?;

    if FormBlockRepo::delete(&state.pool, existing.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "FormBlock",
            id: existing.id,
        }))
    }
}
