//! File artifact rows.

use mediavault_core::media::storage::{Artifact, ArtifactStatus};
use mediavault_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `file_artifacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArtifactRow {
    pub id: DbId,
    pub uuid: Uuid,
    pub locator: String,
    pub owner_id: Option<DbId>,
    pub status: i16,
    pub created_at: Timestamp,
}

impl From<ArtifactRow> for Artifact {
    fn from(row: ArtifactRow) -> Self {
        Artifact {
            id: row.id,
            locator: row.locator,
            owner_id: row.owner_id,
            status: ArtifactStatus::from_i16(row.status),
            created_at: row.created_at,
        }
    }
}
