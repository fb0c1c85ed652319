//! Versioned media entities and their persistence pipeline.
//!
//! - [`entity`]: the [`Media`](entity::Media) record and its field surface.
//! - [`bundle`]: bundle descriptors carrying the ordered field map.
//! - [`plugin`]: the bundle type plugin contract, registry and built-ins.
//! - [`dedup`]: thumbnail artifact resolution by locator.
//! - [`pipeline`]: pre-save, pre-save-revision and the save entry point.
//! - [`submission`]: the edit workflow with optimistic concurrency.
//! - [`access`]: view access evaluation.
//! - [`storage`]: traits implemented by storage back-ends.
//! - [`memory`]: an in-process storage back-end.

pub mod access;
pub mod bundle;
pub mod dedup;
pub mod entity;
pub mod memory;
pub mod pipeline;
pub mod plugin;
pub mod storage;
pub mod submission;

use serde::Serialize;

use crate::types::DbId;

/// A validation message scoped to one form element / entity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Media-domain error type.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Another writer saved the media after the candidate was loaded.
    #[error("{0}")]
    ConcurrencyConflict(String),

    /// The bundle type plugin rejected the candidate.
    #[error("Media validation failed: {}", summarize(.0))]
    BundleValidation(Vec<FieldError>),

    /// The storage write did not complete.
    #[error("The media could not be saved: {0}")]
    PersistFailure(String),

    #[error("Media bundle not found: {0}")]
    UnknownBundle(String),

    #[error("No media type plugin registered as '{0}'")]
    UnknownPlugin(String),

    #[error("Media not found: #{0}")]
    NotFound(DbId),
}

/// Message shown when a submission loses the optimistic concurrency check.
pub const CONCURRENCY_MESSAGE: &str = "The media on this page has either been modified by \
    another user, or you have already submitted modifications using this form. As a result, \
    your changes cannot be saved.";

/// Message for a media item saved without a name.
pub const NAME_REQUIRED_MESSAGE: &str = "Name field is required.";

/// Generic message shown when a save does not yield an id.
pub const SAVE_FAILED_MESSAGE: &str = "The media could not be saved.";

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<storage::StorageError> for MediaError {
    fn from(err: storage::StorageError) -> Self {
        match err {
            storage::StorageError::Conflict => {
                MediaError::ConcurrencyConflict(CONCURRENCY_MESSAGE.to_string())
            }
            other => MediaError::PersistFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_validation_message_lists_fields() {
        let err = MediaError::BundleValidation(vec![
            FieldError::new("image", "The image file is required."),
            FieldError::new("name", "Too long."),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("image: The image file is required."));
        assert!(msg.contains("name: Too long."));
    }

    #[test]
    fn storage_conflict_becomes_concurrency_conflict() {
        let err: MediaError = storage::StorageError::Conflict.into();
        assert!(matches!(err, MediaError::ConcurrencyConflict(_)));
    }

    #[test]
    fn storage_backend_error_becomes_persist_failure() {
        let err: MediaError = storage::StorageError::Backend("disk full".into()).into();
        assert!(matches!(err, MediaError::PersistFailure(msg) if msg.contains("disk full")));
    }
}
