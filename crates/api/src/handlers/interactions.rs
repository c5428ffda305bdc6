//! Handlers for block interactions
//! (`/forms/{uuid}/blocks/{block}/interactions`).

use axum::extract::{Path, State};
use axum::Json;
use formkit_db::models::form_block_interaction::{
    CreateFormBlockInteraction, FormBlockInteraction,
};
use formkit_db::repositories::FormBlockInteractionRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::blocks::find_block;
use crate::handlers::forms::find_owned_form;
use crate::middleware::auth::AuthUser;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// GET /api/v1/forms/{uuid}/blocks/{block}/interactions
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path((uuid, block)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Vec<FormBlockInteraction>>>> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    let block = find_block(&state, &form, &block).await?;
    let interactions = FormBlockInteractionRepo::list_by_block(&state.pool, block.id).await?;
    Ok(Json(DataResponse { data: interactions }))
}

/// POST /api/v1/forms/{uuid}/blocks/{block}/interactions
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Path((uuid, block)): Path<(String, String)>,
    Json(input): Json<CreateFormBlockInteraction>,
) -> AppResult<Created<FormBlockInteraction>> {
    if input.interaction_type.trim().is_empty() {
        return Err(AppError::BadRequest(
            "interaction_type must not be empty".into(),
        ));
    }
    let form = find_owned_form(&state, &uuid, &user).await?;
    let block = find_block(&state, &form, &block).await?;

    let interaction = FormBlockInteractionRepo::create(&state.pool, block.id, &input).await?;
    Ok(created(interaction))
}
