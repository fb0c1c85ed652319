pub mod bundle;
pub mod health;
pub mod media;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /bundles                        list bundles
///
/// /media                          create (POST)
/// /media/validate                 validate a new candidate (POST)
/// /media/{id}                     get, update (PUT)
/// /media/{id}/validate            validate an edit (POST)
/// /media/{id}/revisions           revision history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/bundles", bundle::router())
        .nest("/media", media::router())
}
