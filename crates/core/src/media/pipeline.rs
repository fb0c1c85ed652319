//! The media save pipeline.
//!
//! [`save`] is the entry point every write goes through. It runs
//! [`pre_save`] (authorship, thumbnail, field mapping), stamps timestamps,
//! builds the revision record, runs [`pre_save_revision`] on it and hands
//! both to the storage back-end.

use super::bundle::MediaBundle;
use super::dedup::resolve_or_create;
use super::entity::{Media, ThumbnailRef, THUMBNAIL_ALT};
use super::plugin::{MediaTypePlugin, PluginRegistry};
use super::storage::{ArtifactStore, MediaStorage, PersistResult, RevisionRecord};
use super::{FieldError, MediaError, NAME_REQUIRED_MESSAGE};
use crate::context::ActingContext;

/// Hook run on every save before anything is written.
///
/// 1. Defaults the publisher to the acting user and the revision author to
///    the publisher, leaving explicit values alone.
/// 2. Derives the thumbnail when none is set. A plugin that cannot produce a
///    locator leaves the thumbnail empty.
/// 3. Applies the bundle's field map in order, writing only empty fields
///    that exist on the media.
pub async fn pre_save<S>(
    media: &mut Media,
    bundle: &MediaBundle,
    plugin: &dyn MediaTypePlugin,
    artifacts: &S,
    ctx: &ActingContext,
) -> Result<(), MediaError>
where
    S: ArtifactStore + ?Sized,
{
    if media.publisher_id.is_none() {
        media.publisher_id = Some(ctx.user_id);
    }
    if media.revision_author_id.is_none() {
        media.revision_author_id = media.publisher_id;
    }

    if media.thumbnail.is_none() {
        match plugin.thumbnail(bundle, media) {
            Some(locator) => {
                let target_id = resolve_or_create(artifacts, &locator, media.publisher_id).await?;
                media.thumbnail = Some(ThumbnailRef {
                    target_id,
                    alt: THUMBNAIL_ALT.to_string(),
                    title: media.label().to_string(),
                });
            }
            None => {
                tracing::debug!(bundle = %bundle.id, "No thumbnail source available yet");
            }
        }
    }

    for mapping in &bundle.field_map {
        if !media.has_field(bundle, &mapping.destination)
            || !media.field_is_empty(&mapping.destination)
        {
            continue;
        }
        if let Some(value) = plugin.get_field(bundle, media, &mapping.source) {
            tracing::debug!(
                source = %mapping.source,
                destination = %mapping.destination,
                "Mapped plugin field"
            );
            media.set_field(&mapping.destination, value);
        }
    }

    Ok(())
}

/// Hook run on the revision record right before it is written.
///
/// When the current revision is updated in place with a blank log, the log
/// of the stored revision is carried over so it is not erased.
pub fn pre_save_revision(media: &Media, record: &mut RevisionRecord) {
    if media.is_new_revision() {
        return;
    }
    let Some(original) = media.original() else {
        return;
    };
    if record.revision_log.as_deref().map_or(true, str::is_empty) {
        tracing::debug!(media_id = ?media.id, "Keeping stored revision log");
        record.revision_log = original.revision_log.clone();
    }
}

/// Save `media`, creating it or writing a revision of it.
///
/// The candidate's `changed_at` as passed in is the concurrency token; the
/// storage rejects the write if the stored copy is newer. A name that is
/// still empty after field mapping fails the save. On success the working
/// copy carries the assigned ids and the written revision log, and counts as
/// freshly loaded. On failure its `changed_at` and `created_at` are left as
/// they were passed in, so a retry is checked against the same token.
pub async fn save<S>(
    storage: &S,
    registry: &PluginRegistry,
    ctx: &ActingContext,
    media: &mut Media,
) -> Result<PersistResult, MediaError>
where
    S: MediaStorage + ?Sized,
{
    let bundle = storage
        .load_bundle(&media.bundle)
        .await?
        .ok_or_else(|| MediaError::UnknownBundle(media.bundle.clone()))?;
    let plugin = registry.for_bundle(&bundle)?;

    if let Some(id) = media.id {
        if media.original().is_none() {
            let original = storage
                .load_unchanged(id)
                .await?
                .ok_or(MediaError::NotFound(id))?;
            media.set_original(original);
        }
    }

    let expected_changed = media.changed_at;
    let created_at = media.created_at;

    pre_save(media, &bundle, plugin.as_ref(), storage, ctx).await?;

    if media.name.trim().is_empty() {
        return Err(MediaError::BundleValidation(vec![FieldError::new(
            "name",
            NAME_REQUIRED_MESSAGE,
        )]));
    }

    if media.created_at.is_none() {
        media.created_at = Some(ctx.request_time);
    }
    media.changed_at = Some(ctx.request_time);

    let mut record = RevisionRecord::from_media(media);
    pre_save_revision(media, &mut record);

    let result = match storage.persist(media, &record, expected_changed).await {
        Ok(result) => result,
        Err(err) => {
            media.changed_at = expected_changed;
            media.created_at = created_at;
            tracing::error!(media_id = ?media.id, bundle = %media.bundle, error = %err, "Media persist failed");
            return Err(err.into());
        }
    };

    media.id = Some(result.id);
    media.revision_id = Some(result.revision_id);
    media.revision_author_id = record.revision_author_id;
    media.revision_timestamp = record.revision_timestamp;
    media.revision_log = record.revision_log;
    media.set_new_revision(false);
    media.clear_original();

    tracing::info!(
        media_id = result.id,
        revision_id = result.revision_id,
        bundle = %media.bundle,
        user_id = ctx.user_id,
        "Media saved"
    );

    Ok(result)
}
