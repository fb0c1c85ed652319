//! PostgreSQL storage back-end for the media pipeline.

use async_trait::async_trait;
use mediavault_core::media::bundle::MediaBundle;
use mediavault_core::media::entity::Media;
use mediavault_core::media::storage::{
    Artifact, ArtifactStore, MediaStorage, NewArtifact, PersistResult, RevisionRecord,
    RevisionSummary, StorageError,
};
use mediavault_core::types::{DbId, Timestamp};

use crate::repositories::{ArtifactRepo, BundleRepo, MediaRepo, RevisionWrite};
use crate::DbPool;

fn backend(err: sqlx::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

/// [`MediaStorage`] and [`ArtifactStore`] over a connection pool.
#[derive(Clone)]
pub struct PgMediaStorage {
    pool: DbPool,
}

impl PgMediaStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ArtifactStore for PgMediaStorage {
    async fn find_by_locator(&self, locator: &str) -> Result<Option<DbId>, StorageError> {
        ArtifactRepo::find_id_by_locator(&self.pool, locator)
            .await
            .map_err(backend)
    }

    async fn create_artifact(&self, artifact: NewArtifact) -> Result<Artifact, StorageError> {
        let row = ArtifactRepo::create(&self.pool, &artifact)
            .await
            .map_err(backend)?;
        Ok(row.into())
    }

    async fn load_artifact(&self, id: DbId) -> Result<Option<Artifact>, StorageError> {
        let row = ArtifactRepo::find_by_id(&self.pool, id)
            .await
            .map_err(backend)?;
        Ok(row.map(Artifact::from))
    }
}

#[async_trait]
impl MediaStorage for PgMediaStorage {
    async fn load(&self, id: DbId) -> Result<Option<Media>, StorageError> {
        let row = MediaRepo::find_current(&self.pool, id)
            .await
            .map_err(backend)?;
        Ok(row.map(|r| r.into_media()))
    }

    async fn load_unchanged(&self, id: DbId) -> Result<Option<Media>, StorageError> {
        // Every load reads the database; there is no entity cache to bypass.
        self.load(id).await
    }

    async fn load_bundle(&self, id: &str) -> Result<Option<MediaBundle>, StorageError> {
        let Some(row) = BundleRepo::find_by_id(&self.pool, id)
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };
        row.into_bundle()
            .map(Some)
            .map_err(|e| StorageError::Backend(format!("bundle {id}: {e}")))
    }

    async fn list_bundles(&self) -> Result<Vec<MediaBundle>, StorageError> {
        BundleRepo::list(&self.pool)
            .await
            .map_err(backend)?
            .into_iter()
            .map(|row| {
                let id = row.id.clone();
                row.into_bundle()
                    .map_err(|e| StorageError::Backend(format!("bundle {id}: {e}")))
            })
            .collect()
    }

    async fn persist(
        &self,
        media: &Media,
        record: &RevisionRecord,
        expected_changed: Option<Timestamp>,
    ) -> Result<PersistResult, StorageError> {
        let Some(id) = media.id else {
            return MediaRepo::create(&self.pool, media, record)
                .await
                .map_err(backend);
        };

        match MediaRepo::save_revision(&self.pool, id, media, record, expected_changed)
            .await
            .map_err(backend)?
        {
            RevisionWrite::Written(result) => Ok(result),
            RevisionWrite::Stale => {
                tracing::warn!(media_id = id, "Conditional media write found a newer revision");
                Err(StorageError::Conflict)
            }
            RevisionWrite::Missing => Err(StorageError::Missing(format!("media {id}"))),
        }
    }

    async fn list_revisions(&self, id: DbId) -> Result<Vec<RevisionSummary>, StorageError> {
        let rows = MediaRepo::list_revisions(&self.pool, id)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(RevisionSummary::from).collect())
    }
}
