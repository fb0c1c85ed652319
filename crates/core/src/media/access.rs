//! View access for media.

use super::entity::Media;
use crate::context::ActingContext;
use crate::roles::{PERM_ADMINISTER_MEDIA, PERM_VIEW_MEDIA, PERM_VIEW_OWN_UNPUBLISHED};

/// Decides whether the acting user may view a media item.
pub trait AccessPolicy: Send + Sync {
    fn can_view(&self, ctx: &ActingContext, media: &Media) -> bool;
}

/// Permission-based policy:
///
/// - `administer media` may view everything;
/// - published media requires `view media`;
/// - unpublished media requires ownership and `view own unpublished media`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAccessPolicy;

impl AccessPolicy for DefaultAccessPolicy {
    fn can_view(&self, ctx: &ActingContext, media: &Media) -> bool {
        if ctx.has_permission(PERM_ADMINISTER_MEDIA) {
            return true;
        }
        if media.published {
            return ctx.has_permission(PERM_VIEW_MEDIA);
        }
        media.publisher_id == Some(ctx.user_id) && ctx.has_permission(PERM_VIEW_OWN_UNPUBLISHED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_ADMIN, ROLE_EDITOR, ROLE_VIEWER};

    fn media(published: bool, publisher: i64) -> Media {
        let mut media = Media::empty("doc");
        media.published = published;
        media.publisher_id = Some(publisher);
        media
    }

    #[test]
    fn published_media_is_visible_to_viewers() {
        let ctx = ActingContext::for_role(2, ROLE_VIEWER);
        assert!(DefaultAccessPolicy.can_view(&ctx, &media(true, 1)));
    }

    #[test]
    fn unpublished_media_is_hidden_from_viewers() {
        let ctx = ActingContext::for_role(2, ROLE_VIEWER);
        assert!(!DefaultAccessPolicy.can_view(&ctx, &media(false, 2)));
    }

    #[test]
    fn owners_with_permission_see_their_unpublished_media() {
        let ctx = ActingContext::for_role(2, ROLE_EDITOR);
        assert!(DefaultAccessPolicy.can_view(&ctx, &media(false, 2)));
        assert!(!DefaultAccessPolicy.can_view(&ctx, &media(false, 3)));
    }

    #[test]
    fn admins_see_everything() {
        let ctx = ActingContext::for_role(1, ROLE_ADMIN);
        assert!(DefaultAccessPolicy.can_view(&ctx, &media(false, 9)));
    }

    #[test]
    fn no_permissions_no_access() {
        let ctx = ActingContext::for_role(1, "guest");
        assert!(!DefaultAccessPolicy.can_view(&ctx, &media(true, 1)));
    }
}
