//! In-process storage back-end.
//!
//! Keeps every revision in memory behind a mutex. Used by the core and API
//! test suites; failure switches let them exercise the persist-failure paths.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::bundle::MediaBundle;
use super::entity::Media;
use super::storage::{
    Artifact, ArtifactStore, MediaStorage, NewArtifact, PersistResult, RevisionRecord,
    RevisionSummary, StorageError,
};
use crate::types::{DbId, Timestamp};

struct StoredMedia {
    current_revision: DbId,
    revisions: BTreeMap<DbId, Media>,
}

#[derive(Default)]
struct State {
    next_media_id: DbId,
    next_revision_id: DbId,
    next_artifact_id: DbId,
    media: BTreeMap<DbId, StoredMedia>,
    bundles: BTreeMap<String, MediaBundle>,
    artifacts: BTreeMap<DbId, Artifact>,
    fail_artifact_writes: bool,
    fail_persist: bool,
}

#[derive(Default)]
pub struct InMemoryStorage {
    state: Mutex<State>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundles(bundles: impl IntoIterator<Item = MediaBundle>) -> Self {
        let storage = Self::new();
        for bundle in bundles {
            storage.insert_bundle(bundle);
        }
        storage
    }

    pub fn insert_bundle(&self, bundle: MediaBundle) {
        self.state().bundles.insert(bundle.id.clone(), bundle);
    }

    pub fn artifact_count(&self) -> usize {
        self.state().artifacts.len()
    }

    pub fn revision_count(&self, id: DbId) -> usize {
        self.state()
            .media
            .get(&id)
            .map_or(0, |stored| stored.revisions.len())
    }

    /// Make every artifact insert fail with a back-end error.
    pub fn fail_artifact_writes(&self, fail: bool) {
        self.state().fail_artifact_writes = fail;
    }

    /// Make every media persist fail with a back-end error.
    pub fn fail_persist(&self, fail: bool) {
        self.state().fail_persist = fail;
    }

    /// Overwrite the stored `changed_at` of the current revision, simulating
    /// a concurrent writer.
    pub fn touch(&self, id: DbId, changed_at: Timestamp) {
        let mut state = self.state();
        if let Some(stored) = state.media.get_mut(&id) {
            let current = stored.current_revision;
            if let Some(revision) = stored.revisions.get_mut(&current) {
                revision.changed_at = Some(changed_at);
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(state: &State, id: DbId) -> Option<Media> {
        let stored = state.media.get(&id)?;
        stored
            .revisions
            .get(&stored.current_revision)
            .map(|m| m.clone().loaded())
    }
}

fn stored_copy(media: &Media, record: &RevisionRecord, id: DbId, revision_id: DbId) -> Media {
    let mut copy = media.clone();
    copy.id = Some(id);
    copy.revision_id = Some(revision_id);
    copy.revision_author_id = record.revision_author_id;
    copy.revision_timestamp = record.revision_timestamp;
    copy.revision_log = record.revision_log.clone();
    copy.loaded()
}

#[async_trait]
impl ArtifactStore for InMemoryStorage {
    async fn find_by_locator(&self, locator: &str) -> Result<Option<DbId>, StorageError> {
        Ok(self
            .state()
            .artifacts
            .values()
            .find(|a| a.locator == locator)
            .map(|a| a.id))
    }

    async fn create_artifact(&self, artifact: NewArtifact) -> Result<Artifact, StorageError> {
        let mut state = self.state();
        if state.fail_artifact_writes {
            return Err(StorageError::Backend("artifact write rejected".into()));
        }
        if let Some(existing) = state.artifacts.values().find(|a| a.locator == artifact.locator) {
            return Ok(existing.clone());
        }
        state.next_artifact_id += 1;
        let stored = Artifact {
            id: state.next_artifact_id,
            locator: artifact.locator,
            owner_id: artifact.owner_id,
            status: artifact.status,
            created_at: Utc::now(),
        };
        state.artifacts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn load_artifact(&self, id: DbId) -> Result<Option<Artifact>, StorageError> {
        Ok(self.state().artifacts.get(&id).cloned())
    }
}

#[async_trait]
impl MediaStorage for InMemoryStorage {
    async fn load(&self, id: DbId) -> Result<Option<Media>, StorageError> {
        Ok(Self::current(&self.state(), id))
    }

    async fn load_unchanged(&self, id: DbId) -> Result<Option<Media>, StorageError> {
        Ok(Self::current(&self.state(), id))
    }

    async fn load_bundle(&self, id: &str) -> Result<Option<MediaBundle>, StorageError> {
        Ok(self.state().bundles.get(id).cloned())
    }

    async fn list_bundles(&self) -> Result<Vec<MediaBundle>, StorageError> {
        Ok(self.state().bundles.values().cloned().collect())
    }

    async fn persist(
        &self,
        media: &Media,
        record: &RevisionRecord,
        expected_changed: Option<Timestamp>,
    ) -> Result<PersistResult, StorageError> {
        let mut state = self.state();
        if state.fail_persist {
            return Err(StorageError::Backend("media write rejected".into()));
        }

        let Some(id) = media.id else {
            state.next_media_id += 1;
            state.next_revision_id += 1;
            let (id, revision_id) = (state.next_media_id, state.next_revision_id);
            let copy = stored_copy(media, record, id, revision_id);
            state.media.insert(
                id,
                StoredMedia {
                    current_revision: revision_id,
                    revisions: BTreeMap::from([(revision_id, copy)]),
                },
            );
            return Ok(PersistResult { id, revision_id });
        };

        let current = Self::current(&state, id)
            .ok_or_else(|| StorageError::Missing(format!("media {id}")))?;
        if let (Some(stored), Some(expected)) = (current.changed_at, expected_changed) {
            if stored > expected {
                return Err(StorageError::Conflict);
            }
        }

        let revision_id = if media.is_new_revision() {
            state.next_revision_id += 1;
            state.next_revision_id
        } else {
            let revision_id = media
                .revision_id
                .ok_or_else(|| StorageError::Missing(format!("revision of media {id}")))?;
            // Only the current revision may be updated in place.
            if current.revision_id != Some(revision_id) {
                return Err(StorageError::Conflict);
            }
            revision_id
        };

        let copy = stored_copy(media, record, id, revision_id);
        let stored = state
            .media
            .get_mut(&id)
            .ok_or_else(|| StorageError::Missing(format!("media {id}")))?;
        if !media.is_new_revision() && !stored.revisions.contains_key(&revision_id) {
            return Err(StorageError::Missing(format!("revision {revision_id}")));
        }
        stored.revisions.insert(revision_id, copy);
        stored.current_revision = revision_id;

        Ok(PersistResult { id, revision_id })
    }

    async fn list_revisions(&self, id: DbId) -> Result<Vec<RevisionSummary>, StorageError> {
        let state = self.state();
        let Some(stored) = state.media.get(&id) else {
            return Ok(Vec::new());
        };
        Ok(stored
            .revisions
            .iter()
            .rev()
            .map(|(revision_id, media)| RevisionSummary {
                revision_id: *revision_id,
                name: media.name.clone(),
                revision_author_id: media.revision_author_id,
                revision_timestamp: media.revision_timestamp,
                revision_log: media.revision_log.clone(),
                is_current: *revision_id == stored.current_revision,
            })
            .collect())
    }
}
