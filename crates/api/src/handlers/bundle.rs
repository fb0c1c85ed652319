//! Handlers for the `/bundles` resource.

use axum::extract::State;
use axum::Json;
use mediavault_core::media::bundle::MediaBundle;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A bundle with the source fields its type plugin offers for mapping.
#[derive(Debug, Serialize)]
pub struct BundleResponse {
    #[serde(flatten)]
    pub bundle: MediaBundle,
    /// Empty when the bundle's plugin is not registered.
    pub source_fields: Vec<&'static str>,
}

/// GET /api/v1/bundles
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<BundleResponse>>>> {
    let bundles = state.storage.list_bundles().await?;
    let data = bundles
        .into_iter()
        .map(|bundle| {
            let source_fields = match state.registry.for_bundle(&bundle) {
                Ok(plugin) => plugin.provided_fields().to_vec(),
                Err(err) => {
                    tracing::warn!(bundle = %bundle.id, error = %err, "Bundle plugin not registered");
                    Vec::new()
                }
            };
            BundleResponse {
                bundle,
                source_fields,
            }
        })
        .collect();
    Ok(Json(DataResponse { data }))
}
