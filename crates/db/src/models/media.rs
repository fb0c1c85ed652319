//! Media and media revision rows.

use mediavault_core::media::entity::{Media, ThumbnailRef};
use mediavault_core::media::storage::RevisionSummary;
use mediavault_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// A `media` row joined with one of its `media_revisions` rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaRow {
    pub id: DbId,
    pub uuid: Uuid,
    pub bundle: String,
    pub revision_id: DbId,
    pub langcode: String,
    pub name: String,
    pub media_type: String,
    pub thumbnail_target_id: Option<DbId>,
    pub thumbnail_alt: Option<String>,
    pub thumbnail_title: Option<String>,
    pub publisher_id: Option<DbId>,
    pub published: bool,
    pub created_at: Option<Timestamp>,
    pub changed_at: Option<Timestamp>,
    pub revision_timestamp: Option<Timestamp>,
    pub revision_author_id: Option<DbId>,
    pub revision_log: Option<String>,
    pub fields: Value,
}

impl MediaRow {
    /// Hydrate the stored revision as a loaded [`Media`].
    pub fn into_media(self) -> Media {
        let mut media = Media::empty(&self.bundle);
        media.id = Some(self.id);
        media.uuid = self.uuid;
        media.revision_id = Some(self.revision_id);
        media.langcode = self.langcode;
        media.name = self.name;
        media.media_type = self.media_type;
        media.thumbnail = self.thumbnail_target_id.map(|target_id| ThumbnailRef {
            target_id,
            alt: self.thumbnail_alt.unwrap_or_default(),
            title: self.thumbnail_title.unwrap_or_default(),
        });
        media.publisher_id = self.publisher_id;
        media.published = self.published;
        media.created_at = self.created_at;
        media.changed_at = self.changed_at;
        media.revision_timestamp = self.revision_timestamp;
        media.revision_author_id = self.revision_author_id;
        media.revision_log = self.revision_log;
        media.fields = match self.fields {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        media.loaded()
    }
}

/// Revision listing row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RevisionRow {
    pub revision_id: DbId,
    pub name: String,
    pub revision_author_id: Option<DbId>,
    pub revision_timestamp: Option<Timestamp>,
    pub revision_log: Option<String>,
    pub is_current: bool,
}

impl From<RevisionRow> for RevisionSummary {
    fn from(row: RevisionRow) -> Self {
        RevisionSummary {
            revision_id: row.revision_id,
            name: row.name,
            revision_author_id: row.revision_author_id,
            revision_timestamp: row.revision_timestamp,
            revision_log: row.revision_log,
            is_current: row.is_current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> MediaRow {
        MediaRow {
            id: 4,
            uuid: Uuid::new_v4(),
            bundle: "image".into(),
            revision_id: 9,
            langcode: "en".into(),
            name: "harbour.png".into(),
            media_type: String::new(),
            thumbnail_target_id: Some(2),
            thumbnail_alt: Some("Thumbnail".into()),
            thumbnail_title: Some("harbour.png".into()),
            publisher_id: Some(1),
            published: true,
            created_at: None,
            changed_at: None,
            revision_timestamp: None,
            revision_author_id: Some(1),
            revision_log: Some("initial".into()),
            fields: json!({"image": "public://harbour.png"}),
        }
    }

    #[test]
    fn hydrated_media_updates_current_revision() {
        let media = row().into_media();
        assert_eq!(media.id, Some(4));
        assert_eq!(media.revision_id, Some(9));
        assert!(!media.is_new_revision());
        assert_eq!(media.thumbnail.as_ref().map(|t| t.target_id), Some(2));
        assert_eq!(media.fields["image"], json!("public://harbour.png"));
    }

    #[test]
    fn non_object_fields_hydrate_empty() {
        let mut r = row();
        r.fields = Value::Null;
        r.thumbnail_target_id = None;
        let media = r.into_media();
        assert!(media.fields.is_empty());
        assert!(media.thumbnail.is_none());
    }
}
