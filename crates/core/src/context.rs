//! The acting user of a request.

use chrono::Utc;

use crate::roles::permissions_for_role;
use crate::types::{DbId, Timestamp};

/// Who is performing an operation and when.
///
/// Passed explicitly into the save pipeline and the submission workflow.
/// `request_time` is fixed for the whole request so every timestamp written
/// by one submission is identical.
#[derive(Debug, Clone)]
pub struct ActingContext {
    pub user_id: DbId,
    pub permissions: Vec<String>,
    pub request_time: Timestamp,
}

impl ActingContext {
    pub fn new(user_id: DbId, permissions: Vec<String>, request_time: Timestamp) -> Self {
        Self {
            user_id,
            permissions,
            request_time,
        }
    }

    /// Build a context for a user holding the permissions of `role`, stamped
    /// with the current time.
    pub fn for_role(user_id: DbId, role: &str) -> Self {
        let permissions = permissions_for_role(role)
            .iter()
            .map(|p| (*p).to_string())
            .collect();
        Self::new(user_id, permissions, Utc::now())
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}
