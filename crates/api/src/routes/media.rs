//! Route definitions for the `/media` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::media;
use crate::state::AppState;

/// Routes mounted at `/media`.
///
/// ```text
/// POST   /                    -> create
/// POST   /validate            -> validate_new
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update
/// POST   /{id}/validate       -> validate_existing
/// GET    /{id}/revisions      -> list_revisions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(media::create))
        .route("/validate", post(media::validate_new))
        .route("/{id}", get(media::get_by_id).put(media::update))
        .route("/{id}/validate", post(media::validate_existing))
        .route("/{id}/revisions", get(media::list_revisions))
}
