//! Thumbnail artifact deduplication.
//!
//! Artifacts are keyed by their locator: resolving a locator that is already
//! stored returns the existing artifact, otherwise one permanent artifact is
//! created. Two callers racing on a brand-new locator may both create a
//! record unless the store enforces locator uniqueness. Both bundled stores
//! do.

use super::storage::{ArtifactStore, NewArtifact, StorageError};
use crate::types::DbId;

/// Resolve `locator` to an artifact id, creating a permanent artifact owned
/// by `owner_id` when none exists.
pub async fn resolve_or_create<S>(
    store: &S,
    locator: &str,
    owner_id: Option<DbId>,
) -> Result<DbId, StorageError>
where
    S: ArtifactStore + ?Sized,
{
    if let Some(existing) = store.find_by_locator(locator).await? {
        tracing::debug!(locator, artifact_id = existing, "Reusing thumbnail artifact");
        return Ok(existing);
    }

    let artifact = store
        .create_artifact(NewArtifact::new(locator).owned_by(owner_id).permanent())
        .await?;
    tracing::info!(locator, artifact_id = artifact.id, "Thumbnail artifact created");
    Ok(artifact.id)
}
