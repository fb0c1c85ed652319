//! The media entity.
//!
//! A [`Media`] is one revision of a media item held in memory. Base fields are
//! plain struct members; bundle-declared fields live in [`Media::fields`] as a
//! JSON object keyed by field name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::bundle::MediaBundle;
use crate::types::{DbId, Timestamp};

/// Default language of new media.
pub const DEFAULT_LANGCODE: &str = "en";

/// Value of `published` for published media.
pub const PUBLISHED: bool = true;

/// Value of `published` for unpublished media.
pub const NOT_PUBLISHED: bool = false;

/// Maximum length of the `name` and `type` base fields.
pub const MAX_NAME_LENGTH: usize = 255;

/// Accessibility text attached to every derived thumbnail.
pub const THUMBNAIL_ALT: &str = "Thumbnail";

/// Base fields that hold a single string and may be written by field mapping.
pub const STRING_BASE_FIELDS: &[&str] = &["name", "type", "langcode", "revision_log"];

/// Reference from a media revision to its thumbnail artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailRef {
    pub target_id: DbId,
    pub alt: String,
    pub title: String,
}

/// One revision of a media item.
#[derive(Debug, Clone, Serialize)]
pub struct Media {
    pub id: Option<DbId>,
    pub uuid: Uuid,
    pub revision_id: Option<DbId>,
    pub bundle: String,
    pub langcode: String,
    pub name: String,
    /// The `type` base field.
    pub media_type: String,
    pub thumbnail: Option<ThumbnailRef>,
    pub publisher_id: Option<DbId>,
    pub published: bool,
    pub created_at: Option<Timestamp>,
    /// Last save time. Doubles as the optimistic concurrency token.
    pub changed_at: Option<Timestamp>,
    pub revision_timestamp: Option<Timestamp>,
    pub revision_author_id: Option<DbId>,
    pub revision_log: Option<String>,
    /// Bundle-declared fields.
    pub fields: Map<String, Value>,
    #[serde(skip)]
    new_revision: bool,
    #[serde(skip)]
    original: Option<Box<Media>>,
}

impl Media {
    /// Create an empty, unsaved media item of the given bundle.
    ///
    /// Every field the bundle declares is present in [`Media::fields`] as
    /// `null`.
    pub fn new(bundle: &MediaBundle) -> Self {
        let mut media = Self::empty(&bundle.id);
        media.fields = bundle
            .fields
            .iter()
            .map(|name| (name.clone(), Value::Null))
            .collect();
        media
    }

    /// A blank record with no bundle fields. Storage back-ends start from
    /// this when hydrating a stored revision and finish with [`Media::loaded`].
    pub fn empty(bundle_id: &str) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            revision_id: None,
            bundle: bundle_id.to_string(),
            langcode: DEFAULT_LANGCODE.to_string(),
            name: String::new(),
            media_type: String::new(),
            thumbnail: None,
            publisher_id: None,
            published: NOT_PUBLISHED,
            created_at: None,
            changed_at: None,
            revision_timestamp: None,
            revision_author_id: None,
            revision_log: None,
            fields: Map::new(),
            new_revision: true,
            original: None,
        }
    }

    /// Mark a hydrated record as the stored state: subsequent saves update
    /// the current revision unless a new one is requested.
    pub fn loaded(mut self) -> Self {
        self.new_revision = false;
        self.original = None;
        self
    }

    /// The display label.
    pub fn label(&self) -> &str {
        &self.name
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Whether the next save writes a new revision row. Always true for
    /// unsaved media.
    pub fn is_new_revision(&self) -> bool {
        self.is_new() || self.new_revision
    }

    pub fn set_new_revision(&mut self, value: bool) {
        self.new_revision = value;
    }

    /// The stored state this working copy was loaded from, if any.
    pub fn original(&self) -> Option<&Media> {
        self.original.as_deref()
    }

    pub fn set_original(&mut self, original: Media) {
        self.original = Some(Box::new(original.without_original()));
    }

    pub fn clear_original(&mut self) {
        self.original = None;
    }

    fn without_original(mut self) -> Self {
        self.original = None;
        self
    }

    /// Whether `name` is a field of this media under `bundle`'s schema.
    pub fn has_field(&self, bundle: &MediaBundle, name: &str) -> bool {
        STRING_BASE_FIELDS.contains(&name) || bundle.fields.iter().any(|f| f == name)
    }

    /// Current value of a mappable field, or `None` if it is not set.
    pub fn field_value(&self, name: &str) -> Option<Value> {
        let text = match name {
            "name" => Some(self.name.as_str()),
            "type" => Some(self.media_type.as_str()),
            "langcode" => Some(self.langcode.as_str()),
            "revision_log" => self.revision_log.as_deref(),
            _ => return self.fields.get(name).cloned(),
        };
        text.map(|t| Value::String(t.to_string()))
    }

    /// Whether a field has no value. Unknown fields count as empty.
    pub fn field_is_empty(&self, name: &str) -> bool {
        match self.field_value(name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Array(a)) => a.is_empty(),
            Some(Value::Object(o)) => o.is_empty(),
            Some(_) => false,
        }
    }

    /// Set a mappable field. String base fields take the textual form of the
    /// value; any other name is stored as a bundle field, so callers check
    /// [`Media::has_field`] first.
    pub fn set_field(&mut self, name: &str, value: Value) {
        match name {
            "name" => self.name = value_to_text(value),
            "type" => self.media_type = value_to_text(value),
            "langcode" => self.langcode = value_to_text(value),
            "revision_log" => self.revision_log = Some(value_to_text(value)),
            _ => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
