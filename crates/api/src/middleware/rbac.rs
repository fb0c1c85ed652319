//! Permission-checking extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mediavault_core::error::CoreError;
use mediavault_core::roles::{permissions_for_role, PERM_EDIT_MEDIA};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a role granting `edit media`. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn submit(RequireEditor(user): RequireEditor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !permissions_for_role(&user.role).contains(&PERM_EDIT_MEDIA) {
            return Err(AppError::Core(CoreError::Forbidden(
                "The edit media permission is required".into(),
            )));
        }
        Ok(RequireEditor(user))
    }
}
