//! Videos hosted by YouTube or Vimeo, referenced by URL.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{source_text, MediaTypePlugin};
use crate::media::bundle::MediaBundle;
use crate::media::entity::Media;
use crate::media::FieldError;

/// Default name of the bundle field holding the video URL.
pub const DEFAULT_SOURCE_FIELD: &str = "video_url";

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("valid regex")
});

static VIMEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.|player\.)?vimeo\.com/(?:video/)?(\d+)").expect("valid regex")
});

/// A supported video host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YouTube,
    Vimeo,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::YouTube => "youtube",
            Provider::Vimeo => "vimeo",
        }
    }

    fn thumbnail_url(self, video_id: &str) -> String {
        match self {
            Provider::YouTube => format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg"),
            Provider::Vimeo => format!("https://vumbnail.com/{video_id}.jpg"),
        }
    }
}

/// Identify the provider and video id of `url`.
pub fn parse_video_url(url: &str) -> Option<(Provider, String)> {
    if let Some(caps) = YOUTUBE_RE.captures(url) {
        return Some((Provider::YouTube, caps[1].to_string()));
    }
    VIMEO_RE
        .captures(url)
        .map(|caps| (Provider::Vimeo, caps[1].to_string()))
}

pub struct RemoteVideoPlugin;

impl RemoteVideoPlugin {
    fn parsed(bundle: &MediaBundle, media: &Media) -> Option<(Provider, String)> {
        source_text(media, bundle.config_str("source_field", DEFAULT_SOURCE_FIELD))
            .and_then(parse_video_url)
    }
}

impl MediaTypePlugin for RemoteVideoPlugin {
    fn id(&self) -> &'static str {
        "remote_video"
    }

    fn label(&self) -> &'static str {
        "Remote video"
    }

    fn provided_fields(&self) -> &'static [&'static str] {
        &["provider", "video_id"]
    }

    fn thumbnail(&self, bundle: &MediaBundle, media: &Media) -> Option<String> {
        Self::parsed(bundle, media).map(|(provider, id)| provider.thumbnail_url(&id))
    }

    fn get_field(&self, bundle: &MediaBundle, media: &Media, name: &str) -> Option<Value> {
        let (provider, id) = Self::parsed(bundle, media)?;
        match name {
            "provider" => Some(Value::String(provider.name().to_string())),
            "video_id" => Some(Value::String(id)),
            _ => None,
        }
    }

    fn validate(&self, bundle: &MediaBundle, media: &Media) -> Vec<FieldError> {
        let field = bundle.config_str("source_field", DEFAULT_SOURCE_FIELD);
        match source_text(media, field) {
            None => vec![FieldError::new(field, "A video URL is required.")],
            Some(url) if parse_video_url(url).is_none() => vec![FieldError::new(
                field,
                "Not a valid YouTube or Vimeo video URL.",
            )],
            Some(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle() -> MediaBundle {
        MediaBundle::new("video", "Video", "remote_video").with_fields(&["video_url"])
    }

    fn media_with(url: &str) -> Media {
        let mut media = Media::new(&bundle());
        media.fields.insert("video_url".into(), json!(url));
        media
    }

    #[test]
    fn parses_youtube_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(
                parse_video_url(url),
                Some((Provider::YouTube, "dQw4w9WgXcQ".to_string())),
                "{url}"
            );
        }
    }

    #[test]
    fn parses_vimeo_urls() {
        assert_eq!(
            parse_video_url("https://vimeo.com/76979871"),
            Some((Provider::Vimeo, "76979871".to_string()))
        );
        assert_eq!(
            parse_video_url("https://player.vimeo.com/video/76979871"),
            Some((Provider::Vimeo, "76979871".to_string()))
        );
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(parse_video_url("https://example.com/watch?v=dQw4w9WgXcQ").is_none());
    }

    #[test]
    fn thumbnail_points_at_provider() {
        let media = media_with("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(
            RemoteVideoPlugin.thumbnail(&bundle(), &media).as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
    }

    #[test]
    fn provides_provider_and_id() {
        let media = media_with("https://vimeo.com/76979871");
        let b = bundle();
        assert_eq!(RemoteVideoPlugin.get_field(&b, &media, "provider"), Some(json!("vimeo")));
        assert_eq!(RemoteVideoPlugin.get_field(&b, &media, "video_id"), Some(json!("76979871")));
    }

    #[test]
    fn validation_messages() {
        let b = bundle();
        let missing = RemoteVideoPlugin.validate(&b, &Media::new(&b));
        assert_eq!(missing[0].message, "A video URL is required.");

        let invalid = RemoteVideoPlugin.validate(&b, &media_with("https://example.com/v/1"));
        assert_eq!(invalid[0].field, "video_url");

        assert!(RemoteVideoPlugin
            .validate(&b, &media_with("https://youtu.be/dQw4w9WgXcQ"))
            .is_empty());
    }
}
