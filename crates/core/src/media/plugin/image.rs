//! Local image files.
//!
//! The bundle's source field (configuration key `source_field`, default
//! `image`) holds the locator of the uploaded file. The file itself doubles
//! as the thumbnail source.

use serde_json::Value;

use super::{source_text, MediaTypePlugin};
use crate::media::bundle::MediaBundle;
use crate::media::entity::Media;
use crate::media::FieldError;

/// Default name of the bundle field holding the image locator.
pub const DEFAULT_SOURCE_FIELD: &str = "image";

/// Accepted file extensions (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

pub struct ImagePlugin;

impl ImagePlugin {
    fn locator<'a>(bundle: &MediaBundle, media: &'a Media) -> Option<&'a str> {
        source_text(media, bundle.config_str("source_field", DEFAULT_SOURCE_FIELD))
    }
}

impl MediaTypePlugin for ImagePlugin {
    fn id(&self) -> &'static str {
        "image"
    }

    fn label(&self) -> &'static str {
        "Image"
    }

    fn provided_fields(&self) -> &'static [&'static str] {
        &["filename", "extension", "mime"]
    }

    fn thumbnail(&self, bundle: &MediaBundle, media: &Media) -> Option<String> {
        Self::locator(bundle, media).map(str::to_string)
    }

    fn get_field(&self, bundle: &MediaBundle, media: &Media, name: &str) -> Option<Value> {
        let locator = Self::locator(bundle, media)?;
        let value = match name {
            "filename" => filename(locator).to_string(),
            "extension" => extension(locator)?,
            "mime" => mime_type(&extension(locator)?)?.to_string(),
            _ => return None,
        };
        Some(Value::String(value))
    }

    fn validate(&self, bundle: &MediaBundle, media: &Media) -> Vec<FieldError> {
        let field = bundle.config_str("source_field", DEFAULT_SOURCE_FIELD);
        let Some(locator) = source_text(media, field) else {
            return vec![FieldError::new(field, "An image file is required.")];
        };

        match extension(locator) {
            Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => Vec::new(),
            _ => vec![FieldError::new(
                field,
                format!(
                    "Only files with the following extensions are allowed: {}.",
                    SUPPORTED_EXTENSIONS.join(" ")
                ),
            )],
        }
    }
}

/// Last path segment of a locator.
fn filename(locator: &str) -> &str {
    locator.rsplit('/').next().unwrap_or(locator)
}

/// Lowercase extension of the locator's file name, if it has one.
fn extension(locator: &str) -> Option<String> {
    let name = filename(locator);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn mime_type(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
