//! Route definitions for visitor-facing endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public/forms`.
///
/// ```text
/// GET    /{uuid}                                  -> show
/// GET    /{uuid}/settings.js                      -> settings_js
/// POST   /{uuid}/sessions                         -> start_session
/// POST   /{uuid}/sessions/{session}/responses     -> record_response
/// POST   /{uuid}/sessions/{session}/complete      -> complete_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{uuid}", get(public::show))
        .route("/{uuid}/settings.js", get(public::settings_js))
        .route("/{uuid}/sessions", post(public::start_session))
        .route(
            "/{uuid}/sessions/{session}/responses",
            post(public::record_response),
        )
        .route(
            "/{uuid}/sessions/{session}/complete",
            post(public::complete_session),
        )
}
