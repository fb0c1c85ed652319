//! Bundle type plugins.
//!
//! A plugin knows how to derive a thumbnail locator from a media item, how
//! to expose source metadata as named values for field mapping, and how to
//! validate the item. Plugins are looked up by id through [`PluginRegistry`];
//! each bundle names the plugin that governs it.

pub mod generic;
pub mod image;
pub mod remote_video;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::bundle::MediaBundle;
use super::entity::Media;
use super::{FieldError, MediaError};

pub use generic::GenericPlugin;
pub use image::ImagePlugin;
pub use remote_video::RemoteVideoPlugin;

/// Capabilities a bundle type plugin provides to the save pipeline and the
/// submission workflow.
pub trait MediaTypePlugin: Send + Sync {
    /// Registry key.
    fn id(&self) -> &'static str;

    fn label(&self) -> &'static str;

    /// Names accepted by [`MediaTypePlugin::get_field`].
    fn provided_fields(&self) -> &'static [&'static str];

    /// Locator of the thumbnail source for `media`, or `None` when the
    /// media does not carry enough data yet.
    fn thumbnail(&self, bundle: &MediaBundle, media: &Media) -> Option<String>;

    /// Value of the provided field `name`, or `None` when unavailable.
    fn get_field(&self, bundle: &MediaBundle, media: &Media, name: &str) -> Option<Value>;

    /// Field-scoped problems with `media`. Empty when valid. Must not mutate.
    fn validate(&self, bundle: &MediaBundle, media: &Media) -> Vec<FieldError>;
}

/// Plugins keyed by id.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn MediaTypePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `generic`, `image` and `remote_video`
    /// plugins. `default_thumbnail` is the icon locator used by `generic`.
    pub fn with_builtin(default_thumbnail: &str) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GenericPlugin::new(default_thumbnail)));
        registry.register(Arc::new(ImagePlugin));
        registry.register(Arc::new(RemoteVideoPlugin));
        registry
    }

    /// Register a plugin, replacing any previous plugin with the same id.
    pub fn register(&mut self, plugin: Arc<dyn MediaTypePlugin>) {
        self.plugins.insert(plugin.id().to_string(), plugin);
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn MediaTypePlugin>, MediaError> {
        self.plugins
            .get(id)
            .cloned()
            .ok_or_else(|| MediaError::UnknownPlugin(id.to_string()))
    }

    /// The plugin governing media of `bundle`.
    pub fn for_bundle(&self, bundle: &MediaBundle) -> Result<Arc<dyn MediaTypePlugin>, MediaError> {
        self.get(&bundle.type_plugin)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }
}

/// Read a bundle-field value as a trimmed, non-empty string.
pub(crate) fn source_text<'a>(media: &'a Media, field: &str) -> Option<&'a str> {
    media
        .fields
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
