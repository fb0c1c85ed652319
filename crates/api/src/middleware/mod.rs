//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireEditor`] -- Requires the `edit media` permission.

pub mod auth;
pub mod rbac;
