use std::sync::Arc;

use mediavault_core::media::access::AccessPolicy;
use mediavault_core::media::plugin::PluginRegistry;
use mediavault_core::media::storage::MediaStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Media, bundle and artifact storage.
    pub storage: Arc<dyn MediaStorage>,
    /// Bundle type plugins.
    pub registry: Arc<PluginRegistry>,
    /// View access policy.
    pub access: Arc<dyn AccessPolicy>,
    pub config: Arc<ServerConfig>,
}
