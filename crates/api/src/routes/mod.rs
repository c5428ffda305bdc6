pub mod forms;
pub mod health;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /forms                                           owner endpoints (Bearer token)
/// /forms/{uuid}/blocks                             block editing
/// /forms/{uuid}/blocks/{block}/interactions        interaction editing
///
/// /public/forms/{uuid}                             visitor endpoints (no auth)
/// /public/forms/{uuid}/sessions                    session recording
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/forms", forms::router())
        .nest("/public/forms", public::router())
}
