//! Handlers for the `/media` resource.
//!
//! Create and edit go through the submission workflow: the candidate is
//! built from the request body, validated (stale `changed` token and bundle
//! rules), and saved through the media pipeline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mediavault_core::error::CoreError;
use mediavault_core::media::entity::Media;
use mediavault_core::media::storage::RevisionSummary;
use mediavault_core::media::submission::{MediaInput, MediaSubmission, SubmissionOutcome};
use mediavault_core::media::FieldError;
use mediavault_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /media` and `POST /media/validate`.
#[derive(Debug, Deserialize)]
pub struct CreateMediaRequest {
    /// Bundle of the new media.
    pub bundle: String,
    #[serde(flatten)]
    pub input: MediaInput,
}

/// Result of a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: DbId,
    pub revision_id: DbId,
    /// Where the client should navigate next.
    pub redirect: String,
}

/// Result of a dry-run validation.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl From<Vec<FieldError>> for ValidationReport {
    fn from(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn into_response(outcome: SubmissionOutcome) -> AppResult<SubmissionResponse> {
    match outcome {
        SubmissionOutcome::Saved { result, redirect } => Ok(SubmissionResponse {
            id: result.id,
            revision_id: result.revision_id,
            redirect: redirect.path(),
        }),
        SubmissionOutcome::Rejected { errors } => Err(AppError::Rejected(errors)),
        SubmissionOutcome::Failed { message } => Err(AppError::SaveFailed(message)),
    }
}

fn require_bundle(body: &CreateMediaRequest) -> AppResult<()> {
    if body.bundle.trim().is_empty() {
        return Err(AppError::BadRequest("A media bundle is required".into()));
    }
    Ok(())
}

/// Edits must carry the `changed` value the client loaded.
fn require_changed(input: &MediaInput) -> AppResult<()> {
    if input.changed.is_none() {
        return Err(AppError::BadRequest(
            "The changed value of the edited media is required".into(),
        ));
    }
    Ok(())
}

/// Load media `id` and check the caller may view it.
async fn load_visible(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Media> {
    let media = state
        .storage
        .load(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Media",
            id,
        }))?;
    if !state.access.can_view(&user.context(), &media) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not allowed to view this media".into(),
        )));
    }
    Ok(media)
}

/// POST /api/v1/media
pub async fn create(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(body): Json<CreateMediaRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SubmissionResponse>>)> {
    require_bundle(&body)?;
    let ctx = user.context();
    let submission = MediaSubmission::new(
        state.storage.as_ref(),
        &state.registry,
        state.access.as_ref(),
        &ctx,
    );

    let mut media = submission.start_new(&body.bundle).await?;
    let outcome = submission.submit(&mut media, &body.input).await?;
    let data = into_response(outcome)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// POST /api/v1/media/validate
pub async fn validate_new(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(body): Json<CreateMediaRequest>,
) -> AppResult<Json<DataResponse<ValidationReport>>> {
    require_bundle(&body)?;
    let ctx = user.context();
    let submission = MediaSubmission::new(
        state.storage.as_ref(),
        &state.registry,
        state.access.as_ref(),
        &ctx,
    );

    let mut media = submission.start_new(&body.bundle).await?;
    submission.apply_input(&mut media, &body.input).await?;
    let errors = submission.validate(&media).await?;
    Ok(Json(DataResponse {
        data: errors.into(),
    }))
}

/// GET /api/v1/media/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Media>>> {
    let media = load_visible(&state, &user, id).await?;
    Ok(Json(DataResponse { data: media }))
}

/// PUT /api/v1/media/{id}
///
/// The body must carry the `changed` value the client loaded (400 without
/// it); a newer stored value rejects the edit with 409. `revision: true` saves a new
/// revision instead of updating the current one.
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<MediaInput>,
) -> AppResult<Json<DataResponse<SubmissionResponse>>> {
    let ctx = user.context();
    let submission = MediaSubmission::new(
        state.storage.as_ref(),
        &state.registry,
        state.access.as_ref(),
        &ctx,
    );

    let mut media = submission.start_edit(id).await?;
    require_changed(&input)?;
    let outcome = submission.submit(&mut media, &input).await?;
    let data = into_response(outcome)?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/media/{id}/validate
pub async fn validate_existing(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<MediaInput>,
) -> AppResult<Json<DataResponse<ValidationReport>>> {
    let ctx = user.context();
    let submission = MediaSubmission::new(
        state.storage.as_ref(),
        &state.registry,
        state.access.as_ref(),
        &ctx,
    );

    let mut media = submission.start_edit(id).await?;
    require_changed(&input)?;
    submission.apply_input(&mut media, &input).await?;
    let errors = submission.validate(&media).await?;
    Ok(Json(DataResponse {
        data: errors.into(),
    }))
}

/// GET /api/v1/media/{id}/revisions
///
/// Newest revision first.
pub async fn list_revisions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RevisionSummary>>>> {
    load_visible(&state, &user, id).await?;
    let revisions = state.storage.list_revisions(id).await?;
    Ok(Json(DataResponse { data: revisions }))
}
