//! Repository for the `media_bundles` table.

use mediavault_core::media::bundle::MediaBundle;
use sqlx::PgPool;

use crate::models::bundle::BundleRow;

const COLUMNS: &str = "id, label, description, type_plugin, type_configuration, \
    field_map, fields, created_at, updated_at";

pub struct BundleRepo;

impl BundleRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<BundleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM media_bundles WHERE id = $1");
        sqlx::query_as::<_, BundleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All bundles ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<BundleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM media_bundles ORDER BY id");
        sqlx::query_as::<_, BundleRow>(&query).fetch_all(pool).await
    }

    /// Insert a bundle or replace the stored configuration of the same id.
    pub async fn upsert(pool: &PgPool, bundle: &MediaBundle) -> Result<BundleRow, sqlx::Error> {
        let field_map = serde_json::to_value(&bundle.field_map)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let query = format!(
            "INSERT INTO media_bundles \
                (id, label, description, type_plugin, type_configuration, field_map, fields) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                label = EXCLUDED.label, \
                description = EXCLUDED.description, \
                type_plugin = EXCLUDED.type_plugin, \
                type_configuration = EXCLUDED.type_configuration, \
                field_map = EXCLUDED.field_map, \
                fields = EXCLUDED.fields, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BundleRow>(&query)
            .bind(&bundle.id)
            .bind(&bundle.label)
            .bind(bundle.description.as_deref())
            .bind(&bundle.type_plugin)
            .bind(&bundle.type_configuration)
            .bind(&field_map)
            .bind(&bundle.fields)
            .fetch_one(pool)
            .await
    }
}
