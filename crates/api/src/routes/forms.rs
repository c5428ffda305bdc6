//! Route definitions for the `/forms` resource.
//!
//! Also nests block and interaction routes under `/forms/{uuid}/blocks`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{blocks, forms, interactions};
use crate::state::AppState;

/// Routes mounted at `/forms`.
///
/// ```text
/// GET    /                                        -> list (?filter=)
/// POST   /                                        -> create
/// GET    /{uuid}                                  -> get_by_uuid
/// PUT    /{uuid}                                  -> update
/// DELETE /{uuid}                                  -> delete (soft)
/// POST   /{uuid}/restore                          -> restore
/// POST   /{uuid}/publish                          -> publish
/// POST   /{uuid}/unpublish                        -> unpublish
/// POST   /{uuid}/duplicate                        -> duplicate
/// GET    /{uuid}/template                         -> export_template
/// PUT    /{uuid}/template                         -> apply_template
/// GET    /{uuid}/metrics                          -> metrics
///
/// GET    /{uuid}/blocks                           -> blocks::list
/// POST   /{uuid}/blocks                           -> blocks::create
/// PUT    /{uuid}/blocks/{block}                   -> blocks::update
/// DELETE /{uuid}/blocks/{block}                   -> blocks::delete
/// GET    /{uuid}/blocks/{block}/interactions      -> interactions::list
/// POST   /{uuid}/blocks/{block}/interactions      -> interactions::create
/// ```
pub fn router() -> Router<AppState> {
    let block_routes = Router::new()
        .route("/", get(blocks::list).post(blocks::create))
        .route("/{block}", put(blocks::update).delete(blocks::delete))
        .route(
            "/{block}/interactions",
            get(interactions::list).post(interactions::create),
        );

    Router::new()
        .route("/", get(forms::list).post(forms::create))
        .route(
            "/{uuid}",
            get(forms::get_by_uuid)
                .put(forms::update)
                .delete(forms::delete),
        )
        .route("/{uuid}/restore", post(forms::restore))
        .route("/{uuid}/publish", post(forms::publish))
        .route("/{uuid}/unpublish", post(forms::unpublish))
        .route("/{uuid}/duplicate", post(forms::duplicate))
        .route(
            "/{uuid}/template",
            get(forms::export_template).put(forms::apply_template),
        )
        .route("/{uuid}/metrics", get(forms::metrics))
        .nest("/{uuid}/blocks", block_routes)
}
