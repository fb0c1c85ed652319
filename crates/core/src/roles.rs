//! Well-known role names and the media permissions each one grants.
//!
//! Role names must match the `role` claim issued in access tokens.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

/// Bypasses every media access check.
pub const PERM_ADMINISTER_MEDIA: &str = "administer media";
/// View published media.
pub const PERM_VIEW_MEDIA: &str = "view media";
/// View unpublished media owned by the acting user.
pub const PERM_VIEW_OWN_UNPUBLISHED: &str = "view own unpublished media";
/// Create and edit media.
pub const PERM_EDIT_MEDIA: &str = "edit media";

/// Permissions granted to a role. Unknown roles get none.
pub fn permissions_for_role(role: &str) -> &'static [&'static str] {
    match role {
        ROLE_ADMIN => &[
            PERM_ADMINISTER_MEDIA,
            PERM_VIEW_MEDIA,
            PERM_VIEW_OWN_UNPUBLISHED,
            PERM_EDIT_MEDIA,
        ],
        ROLE_EDITOR => &[PERM_VIEW_MEDIA, PERM_VIEW_OWN_UNPUBLISHED, PERM_EDIT_MEDIA],
        ROLE_VIEWER => &[PERM_VIEW_MEDIA],
        _ => &[],
    }
}
