//! Visitor-facing handlers (`/public/forms/{uuid}`).
//!
//! These require no authentication and only ever see published, active
//! forms. Anything else is reported as not found.

use axum::extract::{Path, State};
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::Json;
use formkit_core::error::CoreError;
use formkit_db::models::form::Form;
use formkit_db::models::form_session::{
    CreateFormSessionResponse, FormSession, FormSessionResponse,
};
use formkit_db::repositories::{
    FormBlockInteractionRepo, FormBlockRepo, FormRepo, FormSessionRepo, UserRepo,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::resources::{public_storyboard, PresentationContext, PublicFormResource};
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Query parameters the visitor arrived with.
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RecordResponseRequest {
    /// Identity of the answered block.
    pub block: String,
    pub value: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

async fn find_published_form(state: &AppState, uuid: &str) -> AppResult<Form> {
    FormRepo::find_published_by_uuid(&state.pool, uuid)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::missing("Form", uuid)))
}

/// Load a session of `form`. Tokens of other forms are not found.
async fn find_session(state: &AppState, form: &Form, session: &str) -> AppResult<FormSession> {
    FormSessionRepo::find_by_session(&state.pool, session)
        .await?
        .filter(|s| s.form_id == form.id)
        .ok_or_else(|| AppError::Core(CoreError::missing("FormSession", session)))
}

async fn public_resource(state: &AppState, form: Form) -> AppResult<PublicFormResource> {
    let owner = UserRepo::find_by_id(&state.pool, form.user_id).await?;
    let blocks = FormBlockRepo::list_by_form(&state.pool, form.id).await?;
    let interactions = FormBlockInteractionRepo::list_by_form(&state.pool, form.id).await?;
    let storyboard = public_storyboard(&blocks, interactions);

    let ctx = PresentationContext {
        app_url: &state.config.app_url,
        assets: state.assets.as_ref(),
        now: chrono::Utc::now(),
    };
    Ok(PublicFormResource::build(form, owner.as_ref(), storyboard, ctx))
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// GET /api/v1/public/forms/{uuid}
pub async fn show(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<PublicFormResource>>> {
    let form = find_published_form(&state, &uuid).await?;
    let resource = public_resource(&state, form).await?;
    Ok(Json(DataResponse { data: resource }))
}

/// GET /api/v1/public/forms/{uuid}/settings.js
///
/// Returns `application/javascript` assigning the public resource to
/// `window.iptSettings`.
pub async fn settings_js(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<(StatusCode, [(HeaderName, &'static str); 1], String)> {
    let form = find_published_form(&state, &uuid).await?;
    let resource = public_resource(&state, form).await?;
    let script = resource
        .javascript_config()
        .map_err(|e| AppError::InternalError(format!("Failed to serialize settings: {e}")))?;
    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "application/javascript")],
        script,
    ))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// POST /api/v1/public/forms/{uuid}/sessions
pub async fn start_session(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(input): Json<StartSessionRequest>,
) -> AppResult<Created<FormSession>> {
    let form = find_published_form(&state, &uuid).await?;
    let session = FormSessionRepo::start(&state.pool, form.id, input.params.as_ref()).await?;
    tracing::debug!(form_id = form.id, session = %session.session, "Started session");
    Ok(created(session))
}

/// POST /api/v1/public/forms/{uuid}/sessions/{session}/responses
pub async fn record_response(
    State(state): State<AppState>,
    Path((uuid, session)): Path<(String, String)>,
    Json(input): Json<RecordResponseRequest>,
) -> AppResult<Created<FormSessionResponse>> {
    let form = find_published_form(&state, &uuid).await?;
    let session = find_session(&state, &form, &session).await?;
    let block = FormBlockRepo::find_by_uuid(&state.pool, form.id, &input.block)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::missing("FormBlock", input.block.clone()))
        })?;

    let response = FormSessionRepo::record_response(
        &state.pool,
        &CreateFormSessionResponse {
            session: session.session,
            form_block_id: block.id,
            value: input.value,
        },
    )
    .await?;
    Ok(created(response))
}

/// POST /api/v1/public/forms/{uuid}/sessions/{session}/complete
pub async fn complete_session(
    State(state): State<AppState>,
    Path((uuid, session)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<FormSession>>> {
    let form = find_published_form(&state, &uuid).await?;
    let session = find_session(&state, &form, &session).await?;

    let completed = FormSessionRepo::complete(&state.pool, &session.session)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    tracing::info!(form_id = form.id, session = %completed.session, "Completed session");
    Ok(Json(DataResponse { data: completed }))
}
