//! Fallback plugin for media without a derivable source.

use serde_json::Value;

use super::MediaTypePlugin;
use crate::media::bundle::MediaBundle;
use crate::media::entity::Media;
use crate::media::FieldError;

/// Uses one fixed icon as thumbnail for every item and provides no fields.
pub struct GenericPlugin {
    default_thumbnail: String,
}

impl GenericPlugin {
    pub fn new(default_thumbnail: &str) -> Self {
        Self {
            default_thumbnail: default_thumbnail.to_string(),
        }
    }
}

impl MediaTypePlugin for GenericPlugin {
    fn id(&self) -> &'static str {
        "generic"
    }

    fn label(&self) -> &'static str {
        "Generic media"
    }

    fn provided_fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn thumbnail(&self, bundle: &MediaBundle, _media: &Media) -> Option<String> {
        Some(bundle.config_str("thumbnail", &self.default_thumbnail).to_string())
    }

    fn get_field(&self, _bundle: &MediaBundle, _media: &Media, _name: &str) -> Option<Value> {
        None
    }

    fn validate(&self, _bundle: &MediaBundle, _media: &Media) -> Vec<FieldError> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn thumbnail_is_the_configured_icon() {
        let plugin = GenericPlugin::new("public://icons/generic.png");
        let bundle = MediaBundle::new("doc", "Document", "generic");
        let media = Media::new(&bundle);
        assert_eq!(
            plugin.thumbnail(&bundle, &media).as_deref(),
            Some("public://icons/generic.png")
        );
    }

    #[test]
    fn bundle_can_override_the_icon() {
        let plugin = GenericPlugin::new("public://icons/generic.png");
        let bundle = MediaBundle::new("doc", "Document", "generic")
            .with_configuration(json!({"thumbnail": "public://icons/doc.png"}));
        let media = Media::new(&bundle);
        assert_eq!(
            plugin.thumbnail(&bundle, &media).as_deref(),
            Some("public://icons/doc.png")
        );
    }

    #[test]
    fn provides_nothing_and_accepts_everything() {
        let plugin = GenericPlugin::new("public://icons/generic.png");
        let bundle = MediaBundle::new("doc", "Document", "generic");
        let media = Media::new(&bundle);
        assert!(plugin.get_field(&bundle, &media, "title").is_none());
        assert!(plugin.validate(&bundle, &media).is_empty());
    }
}
