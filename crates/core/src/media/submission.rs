//! The media edit workflow.
//!
//! A submission walks one candidate through these states:
//!
//! ```text
//! NEW ──────┐  (published, publisher, created pre-filled)
//!           ├─> BUILT ──> VALIDATED ──> SAVING ──> SAVED
//! EXISTING ─┘  (stored log cleared)  └─> REJECTED       └─> SAVE_FAILED
//! ```
//!
//! Validation compares the candidate's `changed` token with the stored copy
//! and then asks the bundle type plugin. The revision decision stamps the
//! revision author and time only when a new revision was requested.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::access::AccessPolicy;
use super::bundle::MediaBundle;
use super::entity::{Media, MAX_NAME_LENGTH, PUBLISHED};
use super::pipeline;
use super::plugin::PluginRegistry;
use super::storage::{MediaStorage, PersistResult};
use super::{
    FieldError, MediaError, CONCURRENCY_MESSAGE, NAME_REQUIRED_MESSAGE, SAVE_FAILED_MESSAGE,
};
use crate::context::ActingContext;
use crate::types::{DbId, Timestamp};

/// Field the concurrency error is attributed to.
pub const CHANGED_FIELD: &str = "changed";

/// Submitted form values. Absent values leave the candidate untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInput {
    pub name: Option<String>,
    pub langcode: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub published: Option<bool>,
    pub publisher_id: Option<DbId>,
    pub created_at: Option<Timestamp>,
    /// The `changed` value the editor's form was rendered with.
    pub changed: Option<Timestamp>,
    pub revision_log: Option<String>,
    /// Whether to save as a new revision.
    #[serde(default)]
    pub revision: bool,
    /// Values of bundle fields.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Where the client should go after a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// The saved media's canonical page.
    Canonical(DbId),
    /// The default landing page.
    Front,
}

impl Redirect {
    pub fn path(&self) -> String {
        match self {
            Redirect::Canonical(id) => format!("/media/{id}"),
            Redirect::Front => "/".to_string(),
        }
    }
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Saved {
        result: PersistResult,
        redirect: Redirect,
    },
    /// Validation failed; redisplay the submission with these messages.
    Rejected { errors: Vec<FieldError> },
    /// The write failed; rebuild the form and show `message`. Never retried.
    Failed { message: String },
}

/// Drives submissions for one acting user.
pub struct MediaSubmission<'a, S: MediaStorage + ?Sized> {
    storage: &'a S,
    registry: &'a PluginRegistry,
    access: &'a dyn AccessPolicy,
    ctx: &'a ActingContext,
}

impl<'a, S: MediaStorage + ?Sized> MediaSubmission<'a, S> {
    pub fn new(
        storage: &'a S,
        registry: &'a PluginRegistry,
        access: &'a dyn AccessPolicy,
        ctx: &'a ActingContext,
    ) -> Self {
        Self {
            storage,
            registry,
            access,
            ctx,
        }
    }

    async fn bundle(&self, id: &str) -> Result<MediaBundle, MediaError> {
        self.storage
            .load_bundle(id)
            .await?
            .ok_or_else(|| MediaError::UnknownBundle(id.to_string()))
    }

    /// NEW: a blank candidate of `bundle_id` with submission defaults.
    pub async fn start_new(&self, bundle_id: &str) -> Result<Media, MediaError> {
        let bundle = self.bundle(bundle_id).await?;
        let mut media = Media::new(&bundle);
        prepare(&mut media, self.ctx);
        Ok(media)
    }

    /// EXISTING: the stored media as a working copy, stored log cleared.
    pub async fn start_edit(&self, id: DbId) -> Result<Media, MediaError> {
        let mut media = self
            .storage
            .load(id)
            .await?
            .ok_or(MediaError::NotFound(id))?;
        prepare(&mut media, self.ctx);
        Ok(media)
    }

    /// BUILT: copy `input` onto a started candidate.
    pub async fn apply_input(&self, media: &mut Media, input: &MediaInput) -> Result<(), MediaError> {
        let bundle = self.bundle(&media.bundle).await?;
        build(media, &bundle, input);
        Ok(())
    }

    /// Field-scoped problems with `candidate`: a stale `changed` token first,
    /// then the name, then whatever the bundle type plugin reports.
    ///
    /// An empty name passes when the bundle maps a plugin value into it; the
    /// save rejects it if the mapping produced nothing.
    pub async fn validate(&self, candidate: &Media) -> Result<Vec<FieldError>, MediaError> {
        let mut errors = Vec::new();

        if let Some(id) = candidate.id {
            if let Some(unchanged) = self.storage.load_unchanged(id).await? {
                if unchanged.changed_at > candidate.changed_at {
                    tracing::warn!(
                        media_id = id,
                        user_id = self.ctx.user_id,
                        "Rejected stale media submission"
                    );
                    errors.push(FieldError::new(CHANGED_FIELD, CONCURRENCY_MESSAGE));
                }
            }
        }

        let bundle = self.bundle(&candidate.bundle).await?;

        if candidate.name.trim().is_empty() {
            if !bundle.field_map.iter().any(|m| m.destination == "name") {
                errors.push(FieldError::new("name", NAME_REQUIRED_MESSAGE));
            }
        } else if candidate.name.chars().count() > MAX_NAME_LENGTH {
            errors.push(FieldError::new(
                "name",
                format!("Name cannot be longer than {MAX_NAME_LENGTH} characters."),
            ));
        }

        let plugin = self.registry.for_bundle(&bundle)?;
        errors.extend(plugin.validate(&bundle, candidate));

        Ok(errors)
    }

    /// Validate and save a fully built candidate.
    ///
    /// A stale token is reported as [`MediaError::ConcurrencyConflict`] even
    /// when the plugin found problems too; otherwise plugin problems are
    /// reported as [`MediaError::BundleValidation`].
    pub async fn save_candidate(
        &self,
        media: &mut Media,
        new_revision: bool,
    ) -> Result<PersistResult, MediaError> {
        let errors = self.validate(media).await?;
        if errors.iter().any(|e| e.field == CHANGED_FIELD) {
            return Err(MediaError::ConcurrencyConflict(CONCURRENCY_MESSAGE.to_string()));
        }
        if !errors.is_empty() {
            return Err(MediaError::BundleValidation(errors));
        }

        apply_revision_choice(media, new_revision, self.ctx);
        pipeline::save(self.storage, self.registry, self.ctx, media).await
    }

    /// Run a complete submission of `input` against a started candidate.
    ///
    /// Storage or configuration failures outside the save itself (unknown
    /// bundle, unreadable storage during validation) are returned as errors.
    pub async fn submit(
        &self,
        media: &mut Media,
        input: &MediaInput,
    ) -> Result<SubmissionOutcome, MediaError> {
        self.apply_input(media, input).await?;

        let errors = self.validate(media).await?;
        if !errors.is_empty() {
            return Ok(SubmissionOutcome::Rejected { errors });
        }

        apply_revision_choice(media, input.revision, self.ctx);

        match pipeline::save(self.storage, self.registry, self.ctx, media).await {
            Ok(result) => {
                let redirect = if self.access.can_view(self.ctx, media) {
                    Redirect::Canonical(result.id)
                } else {
                    Redirect::Front
                };
                Ok(SubmissionOutcome::Saved { result, redirect })
            }
            Err(MediaError::ConcurrencyConflict(message)) => Ok(SubmissionOutcome::Rejected {
                errors: vec![FieldError::new(CHANGED_FIELD, message)],
            }),
            Err(MediaError::BundleValidation(errors)) => Ok(SubmissionOutcome::Rejected { errors }),
            Err(MediaError::PersistFailure(reason)) => {
                tracing::error!(media_id = ?media.id, %reason, "Media submission could not be saved");
                Ok(SubmissionOutcome::Failed {
                    message: SAVE_FAILED_MESSAGE.to_string(),
                })
            }
            Err(other) => Err(other),
        }
    }
}

/// Apply submission defaults to a freshly started candidate.
///
/// New media become published, owned by the acting user and created now.
/// Existing media drop their stored revision log so it is not resubmitted
/// as the log of this edit.
pub fn prepare(media: &mut Media, ctx: &ActingContext) {
    if media.is_new() {
        media.published = PUBLISHED;
        media.publisher_id = Some(ctx.user_id);
        media.created_at = Some(ctx.request_time);
    } else {
        media.revision_log = None;
    }
}

/// Copy submitted values onto the candidate. Values for fields the bundle
/// does not declare are ignored.
pub fn build(media: &mut Media, bundle: &MediaBundle, input: &MediaInput) {
    if let Some(name) = &input.name {
        media.name = name.clone();
    }
    if let Some(langcode) = &input.langcode {
        media.langcode = langcode.clone();
    }
    if let Some(media_type) = &input.media_type {
        media.media_type = media_type.clone();
    }
    if let Some(published) = input.published {
        media.published = published;
    }
    if let Some(publisher_id) = input.publisher_id {
        media.publisher_id = Some(publisher_id);
    }
    if let Some(created_at) = input.created_at {
        media.created_at = Some(created_at);
    }
    if let Some(changed) = input.changed {
        media.changed_at = Some(changed);
    }
    if let Some(log) = &input.revision_log {
        media.revision_log = Some(log.clone());
    }
    for (name, value) in &input.fields {
        if bundle.fields.iter().any(|f| f == name) {
            media.fields.insert(name.clone(), value.clone());
        } else {
            tracing::debug!(field = %name, bundle = %bundle.id, "Ignoring undeclared field");
        }
    }
}

/// Decide between a new revision and an in-place update.
pub fn apply_revision_choice(media: &mut Media, new_revision: bool, ctx: &ActingContext) {
    if new_revision {
        media.set_new_revision(true);
        media.revision_timestamp = Some(ctx.request_time);
        media.revision_author_id = Some(ctx.user_id);
    } else {
        media.set_new_revision(false);
    }
}
