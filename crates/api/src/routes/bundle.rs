//! Route definitions for the `/bundles` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::bundle;
use crate::state::AppState;

/// Routes mounted at `/bundles`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(bundle::list))
}
