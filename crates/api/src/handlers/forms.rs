//! Handlers for the `/forms` resource.
//!
//! Every handler here acts on behalf of the authenticated owner; a form
//! owned by someone else is reported as forbidden.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use formkit_core::error::CoreError;
use formkit_core::template::{pick_attributes, FormTemplate};
use formkit_core::types::DbId;
use formkit_db::models::form::{CreateForm, Form, FormSettings, UpdateForm};
use formkit_db::repositories::{
    FormBlockRepo, FormRepo, FormSessionRepo, FormTemplateRepo, TeamRepo, UserRepo,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::FormFilterParams;
use crate::resources::{FormMetrics, FormResource, FormSummary, PresentationContext};
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFormRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub team_id: Option<DbId>,
}

/// Partial update. `settings` is merged key by key into the stored
/// settings; keys outside the template allow-list are ignored.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateFormRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub is_notification_via_mail: Option<bool>,
    pub show_privacy_link: Option<bool>,
    pub has_data_privacy: Option<bool>,
    pub settings: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DuplicateFormRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Shared lookups
// ---------------------------------------------------------------------------

fn form_not_found(uuid: &str) -> AppError {
    AppError::Core(CoreError::missing("Form", uuid))
}

/// Reject access to a form the acting user does not own.
pub(crate) fn ensure_owner(form: &Form, user: &AuthUser) -> AppResult<()> {
    if form.is_owner(Some(user.user_id)) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You do not own this form".into(),
        )))
    }
}

/// Load an active form owned by `user`.
pub(crate) async fn find_owned_form(
    state: &AppState,
    uuid: &str,
    user: &AuthUser,
) -> AppResult<Form> {
    let form = FormRepo::find_by_uuid(&state.pool, uuid)
        .await?
        .ok_or_else(|| form_not_found(uuid))?;
    ensure_owner(&form, user)?;
    Ok(form)
}

/// Build the owner view of `form`, including its session metrics.
async fn form_resource(state: &AppState, form: Form) -> AppResult<FormResource> {
    let owner = UserRepo::find_by_id(&state.pool, form.user_id).await?;
    let block_ids = FormBlockRepo::list_ids_by_form(&state.pool, form.id).await?;
    let now = chrono::Utc::now();
    let counts = FormSessionRepo::counts(&state.pool, &block_ids, now).await?;

    let ctx = PresentationContext {
        app_url: &state.config.app_url,
        assets: state.assets.as_ref(),
        now,
    };
    Ok(FormResource::build(
        form,
        owner.as_ref(),
        block_ids.len(),
        FormMetrics::from(counts),
        ctx,
    ))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/forms?filter=published|unpublished|trashed
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FormFilterParams>,
) -> AppResult<Json<DataResponse<Vec<FormSummary>>>> {
    let filter = params.publication_filter();
    let forms = FormRepo::list_for_user(&state.pool, user.user_id, filter).await?;
    tracing::debug!(user_id = user.user_id, ?filter, count = forms.len(), "Listed forms");

    let now = chrono::Utc::now();
    let data = forms.iter().map(|f| FormSummary::build(f, now)).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/forms
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFormRequest>,
) -> AppResult<Created<FormResource>> {
    input.validate()?;

    if let Some(team_id) = input.team_id {
        let team = TeamRepo::find_by_id(&state.pool, team_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Team",
                id: team_id,
            }))?;
        if team.user_id != user.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "You do not own this team".into(),
            )));
        }
    }

    let form = FormRepo::create(
        &state.pool,
        &CreateForm {
            user_id: user.user_id,
            team_id: input.team_id,
            name: input.name,
        },
        &state.short_ids,
    )
    .await?;
    tracing::info!(form_id = form.id, uuid = %form.uuid, user_id = user.user_id, "Created form");

    let resource = form_resource(&state, form).await?;
    Ok(created(resource))
}

/// GET /api/v1/forms/{uuid}
pub async fn get_by_uuid(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<FormResource>>> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    let resource = form_resource(&state, form).await?;
    Ok(Json(DataResponse { data: resource }))
}

/// PUT /api/v1/forms/{uuid}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(input): Json<UpdateFormRequest>,
) -> AppResult<Json<DataResponse<FormResource>>> {
    input.validate()?;
    let form = find_owned_form(&state, &uuid, &user).await?;

    let mut tx = state.pool.begin().await?;

    if let Some(changes) = &input.settings {
        let merged = merge_settings(&form.settings, changes)?;
        FormRepo::update_settings_in(&mut tx, form.id, &merged)
            .await?
            .ok_or_else(|| form_not_found(&uuid))?;
    }

    let form = FormRepo::update_in(
        &mut tx,
        form.id,
        &UpdateForm {
            name: input.name,
            is_notification_via_mail: input.is_notification_via_mail,
            show_privacy_link: input.show_privacy_link,
            has_data_privacy: input.has_data_privacy,
        },
    )
    .await?
    .ok_or_else(|| form_not_found(&uuid))?;

    tx.commit().await?;
    tracing::info!(form_id = form.id, "Updated form");

    let resource = form_resource(&state, form).await?;
    Ok(Json(DataResponse { data: resource }))
}

/// Apply allow-listed `changes` on top of `current`.
fn merge_settings(
    current: &FormSettings,
    changes: &serde_json::Map<String, serde_json::Value>,
) -> AppResult<FormSettings> {
    let mut value = serde_json::to_value(current)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize settings: {e}")))?;
    if let Some(obj) = value.as_object_mut() {
        obj.extend(pick_attributes(&serde_json::Value::Object(changes.clone())));
    }
    serde_json::from_value(value)
        .map_err(|e| AppError::Core(CoreError::Validation(format!("Invalid settings: {e}"))))
}

/// DELETE /api/v1/forms/{uuid}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<StatusCode> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    if FormRepo::soft_delete(&state.pool, form.id).await? {
        tracing::info!(form_id = form.id, "Moved form to trash");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(form_not_found(&uuid))
    }
}

/// POST /api/v1/forms/{uuid}/restore
pub async fn restore(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<FormResource>>> {
    let form = FormRepo::find_by_uuid_include_deleted(&state.pool, &uuid)
        .await?
        .ok_or_else(|| form_not_found(&uuid))?;
    ensure_owner(&form, &user)?;

    if !FormRepo::restore(&state.pool, form.id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Form is not in the trash".into(),
        )));
    }
    tracing::info!(form_id = form.id, "Restored form");

    let form = FormRepo::find_by_id(&state.pool, form.id)
        .await?
        .ok_or_else(|| form_not_found(&uuid))?;
    let resource = form_resource(&state, form).await?;
    Ok(Json(DataResponse { data: resource }))
}

// ---------------------------------------------------------------------------
// Publication
// ---------------------------------------------------------------------------

/// POST /api/v1/forms/{uuid}/publish
pub async fn publish(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<FormResource>>> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    let form = FormRepo::publish(&state.pool, form.id)
        .await?
        .ok_or_else(|| form_not_found(&uuid))?;
    tracing::info!(form_id = form.id, "Published form");

    let resource = form_resource(&state, form).await?;
    Ok(Json(DataResponse { data: resource }))
}

/// POST /api/v1/forms/{uuid}/unpublish
pub async fn unpublish(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<FormResource>>> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    let form = FormRepo::unpublish(&state.pool, form.id)
        .await?
        .ok_or_else(|| form_not_found(&uuid))?;
    tracing::info!(form_id = form.id, "Unpublished form");

    let resource = form_resource(&state, form).await?;
    Ok(Json(DataResponse { data: resource }))
}

// ---------------------------------------------------------------------------
// Duplication and templates
// ---------------------------------------------------------------------------

/// POST /api/v1/forms/{uuid}/duplicate
pub async fn duplicate(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(input): Json<DuplicateFormRequest>,
) -> AppResult<Created<FormResource>> {
    input.validate()?;
    let source = find_owned_form(&state, &uuid, &user).await?;

    let copy = FormRepo::duplicate(&state.pool, &source, &input.name, &state.short_ids).await?;

    let resource = form_resource(&state, copy).await?;
    Ok(created(resource))
}

/// GET /api/v1/forms/{uuid}/template
pub async fn export_template(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<FormTemplate>>> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    let template = FormTemplateRepo::export(&state.pool, &form).await?;
    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/forms/{uuid}/template
///
/// Replaces the form's settings and blocks with the template's.
pub async fn apply_template(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Json(template): Json<FormTemplate>,
) -> AppResult<Json<DataResponse<FormResource>>> {
    template.validate()?;
    serde_json::from_value::<FormSettings>(template.allowed_attributes()).map_err(|e| {
        AppError::Core(CoreError::Validation(format!(
            "Invalid template attributes: {e}"
        )))
    })?;
    let form = find_owned_form(&state, &uuid, &user).await?;

    let created = FormTemplateRepo::apply(&state.pool, form.id, &template).await?;
    tracing::info!(form_id = form.id, blocks = created, "Applied template to form");

    let form = FormRepo::find_by_id(&state.pool, form.id)
        .await?
        .ok_or_else(|| form_not_found(&uuid))?;
    let resource = form_resource(&state, form).await?;
    Ok(Json(DataResponse { data: resource }))
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// GET /api/v1/forms/{uuid}/metrics
pub async fn metrics(
    user: AuthUser,
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<Json<DataResponse<FormMetrics>>> {
    let form = find_owned_form(&state, &uuid, &user).await?;
    let block_ids = FormBlockRepo::list_ids_by_form(&state.pool, form.id).await?;
    let counts = FormSessionRepo::counts(&state.pool, &block_ids, chrono::Utc::now()).await?;
    Ok(Json(DataResponse {
        data: FormMetrics::from(counts),
    }))
}
