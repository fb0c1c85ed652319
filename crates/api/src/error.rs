use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mediavault_core::error::CoreError;
use mediavault_core::media::storage::StorageError;
use mediavault_core::media::submission::CHANGED_FIELD;
use mediavault_core::media::{FieldError, MediaError, SAVE_FAILED_MESSAGE};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`MediaError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// JSON error responses of the form `{"error": ..., "code": ...}`; field-scoped
/// failures add an `"errors"` list.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A submission failed validation.
    #[error("Submission rejected")]
    Rejected(Vec<FieldError>),

    /// A submission passed validation but could not be written.
    #[error("{0}")]
    SaveFailed(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self {
            AppError::Core(core) => core_body(core),
            AppError::Media(media) => media_body(media),
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                plain(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.into(),
                )
            }
            AppError::Rejected(errors) => rejected(errors),
            AppError::SaveFailed(message) => save_failed(message),
            AppError::BadRequest(msg) => plain(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        };

        let (status, json) = body;
        (status, axum::Json(json)).into_response()
    }
}

type Body = (StatusCode, serde_json::Value);

fn plain(status: StatusCode, code: &str, message: String) -> Body {
    (status, json!({ "error": message, "code": code }))
}

fn core_body(core: CoreError) -> Body {
    match core {
        CoreError::NotFound { entity, id } => plain(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Unauthorized(msg) => plain(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => plain(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
    }
}

fn media_body(err: MediaError) -> Body {
    match err {
        MediaError::ConcurrencyConflict(message) => {
            rejected(vec![FieldError::new(CHANGED_FIELD, message)])
        }
        MediaError::BundleValidation(errors) => rejected(errors),
        MediaError::PersistFailure(reason) => {
            tracing::error!(%reason, "Media persist failed");
            save_failed(SAVE_FAILED_MESSAGE.to_string())
        }
        MediaError::UnknownBundle(id) => plain(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            format!("Unknown media bundle: {id}"),
        ),
        MediaError::NotFound(id) => plain(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Media with id {id} not found"),
        ),
        MediaError::UnknownPlugin(id) => {
            tracing::error!(plugin = %id, "Bundle references an unregistered type plugin");
            plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.into(),
            )
        }
    }
}

/// 409 when the concurrency check failed, 422 otherwise. Every field error
/// is listed either way.
fn rejected(errors: Vec<FieldError>) -> Body {
    let stale = errors.iter().find(|e| e.field == CHANGED_FIELD);
    let (status, code, message) = match stale {
        Some(e) => (StatusCode::CONFLICT, "CONFLICT", e.message.clone()),
        None => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            "Media validation failed".to_string(),
        ),
    };
    (
        status,
        json!({ "error": message, "code": code, "errors": errors }),
    )
}

fn save_failed(message: String) -> Body {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": message, "code": "SAVE_FAILED", "rebuild": true }),
    )
}
