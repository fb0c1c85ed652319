//! Storage contracts consumed by the save pipeline and the submission
//! workflow.
//!
//! Back-ends implement [`MediaStorage`] and [`ArtifactStore`]. Both traits
//! are object safe so the HTTP layer can hold them as `Arc<dyn ...>`.

use async_trait::async_trait;
use serde::Serialize;

use super::bundle::MediaBundle;
use super::entity::Media;
use crate::types::{DbId, Timestamp};

/// Storage back-end failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A conditional write found a newer stored `changed_at`.
    #[error("The stored media was modified after the candidate was loaded")]
    Conflict,

    /// The row to update does not exist.
    #[error("Stored record not found: {0}")]
    Missing(String),

    #[error("Storage back-end error: {0}")]
    Backend(String),
}

/// Identifiers assigned by a successful persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersistResult {
    pub id: DbId,
    pub revision_id: DbId,
}

/// The revision-scoped columns of the row about to be written.
///
/// Built from the media right before persisting; the pre-save-revision hook
/// may rewrite it. Storage writes these values rather than the media's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRecord {
    pub revision_author_id: Option<DbId>,
    pub revision_timestamp: Option<Timestamp>,
    pub revision_log: Option<String>,
}

impl RevisionRecord {
    pub fn from_media(media: &Media) -> Self {
        Self {
            revision_author_id: media.revision_author_id,
            revision_timestamp: media.revision_timestamp,
            revision_log: media.revision_log.clone(),
        }
    }
}

/// A revision summary for history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionSummary {
    pub revision_id: DbId,
    pub name: String,
    pub revision_author_id: Option<DbId>,
    pub revision_timestamp: Option<Timestamp>,
    pub revision_log: Option<String>,
    pub is_current: bool,
}

/// Garbage-collection status of a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Eligible for cleanup once unreferenced.
    Temporary,
    /// Never cleaned up automatically.
    Permanent,
}

impl ArtifactStatus {
    /// Database encoding.
    pub fn as_i16(self) -> i16 {
        match self {
            ArtifactStatus::Temporary => 0,
            ArtifactStatus::Permanent => 1,
        }
    }

    pub fn from_i16(value: i16) -> Self {
        if value == 1 {
            ArtifactStatus::Permanent
        } else {
            ArtifactStatus::Temporary
        }
    }
}

/// A stored file artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub id: DbId,
    pub locator: String,
    pub owner_id: Option<DbId>,
    pub status: ArtifactStatus,
    pub created_at: Timestamp,
}

/// Insert payload for a new artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    pub locator: String,
    pub owner_id: Option<DbId>,
    pub status: ArtifactStatus,
}

impl NewArtifact {
    /// A temporary, unowned artifact for `locator`.
    pub fn new(locator: &str) -> Self {
        Self {
            locator: locator.to_string(),
            owner_id: None,
            status: ArtifactStatus::Temporary,
        }
    }

    pub fn owned_by(mut self, owner_id: Option<DbId>) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.status = ArtifactStatus::Permanent;
        self
    }
}

/// Artifact CRUD needed by the deduplicator.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Id of an artifact whose locator is byte-equal to `locator`.
    async fn find_by_locator(&self, locator: &str) -> Result<Option<DbId>, StorageError>;

    /// Insert an artifact in a single write and return it.
    async fn create_artifact(&self, artifact: NewArtifact) -> Result<Artifact, StorageError>;

    async fn load_artifact(&self, id: DbId) -> Result<Option<Artifact>, StorageError>;
}

/// Entity storage for media and bundle configuration.
#[async_trait]
pub trait MediaStorage: ArtifactStore {
    /// Load the current revision, possibly from a cache.
    async fn load(&self, id: DbId) -> Result<Option<Media>, StorageError>;

    /// Load the current revision straight from storage, bypassing caches.
    async fn load_unchanged(&self, id: DbId) -> Result<Option<Media>, StorageError>;

    async fn load_bundle(&self, id: &str) -> Result<Option<MediaBundle>, StorageError>;

    async fn list_bundles(&self) -> Result<Vec<MediaBundle>, StorageError>;

    /// Write `media` with the revision columns from `record`.
    ///
    /// New media get a media row plus a first revision. Existing media get a
    /// new revision row when [`Media::is_new_revision`] is set, otherwise
    /// their current revision is updated in place. For existing media the
    /// write must fail with [`StorageError::Conflict`] if the stored
    /// `changed_at` is newer than `expected_changed`.
    async fn persist(
        &self,
        media: &Media,
        record: &RevisionRecord,
        expected_changed: Option<Timestamp>,
    ) -> Result<PersistResult, StorageError>;

    /// All revisions of a media item, newest first.
    async fn list_revisions(&self, id: DbId) -> Result<Vec<RevisionSummary>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_artifact_builder() {
        let artifact = NewArtifact::new("public://a.png").owned_by(Some(4)).permanent();
        assert_eq!(artifact.locator, "public://a.png");
        assert_eq!(artifact.owner_id, Some(4));
        assert_eq!(artifact.status, ArtifactStatus::Permanent);
    }

    #[test]
    fn artifact_status_encoding() {
        assert_eq!(ArtifactStatus::Permanent.as_i16(), 1);
        assert_eq!(ArtifactStatus::from_i16(1), ArtifactStatus::Permanent);
        assert_eq!(ArtifactStatus::from_i16(0), ArtifactStatus::Temporary);
    }
}
