//! Repository for the `file_artifacts` table.

use mediavault_core::media::storage::NewArtifact;
use mediavault_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::artifact::ArtifactRow;

const COLUMNS: &str = "id, uuid, locator, owner_id, status, created_at";

pub struct ArtifactRepo;

impl ArtifactRepo {
    /// Id of the artifact stored under exactly `locator`.
    pub async fn find_id_by_locator(
        pool: &PgPool,
        locator: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM file_artifacts WHERE locator = $1")
            .bind(locator)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ArtifactRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM file_artifacts WHERE id = $1");
        sqlx::query_as::<_, ArtifactRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an artifact. If another writer stored the same locator first,
    /// that row is returned instead.
    pub async fn create(pool: &PgPool, input: &NewArtifact) -> Result<ArtifactRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO file_artifacts (uuid, locator, owner_id, status) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (locator) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, ArtifactRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.locator)
            .bind(input.owner_id)
            .bind(input.status.as_i16())
            .fetch_optional(pool)
            .await?;
        if let Some(row) = inserted {
            return Ok(row);
        }

        let query = format!("SELECT {COLUMNS} FROM file_artifacts WHERE locator = $1");
        sqlx::query_as::<_, ArtifactRow>(&query)
            .bind(&input.locator)
            .fetch_one(pool)
            .await
    }
}
