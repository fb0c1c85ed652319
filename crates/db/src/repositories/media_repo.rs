//! Repository for the `media` and `media_revisions` tables.
//!
//! The `media` row holds identity and a pointer to the current revision;
//! every other column lives on the revision row.

use mediavault_core::media::entity::Media;
use mediavault_core::media::storage::{PersistResult, RevisionRecord};
use mediavault_core::types::{DbId, Timestamp};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use crate::models::media::{MediaRow, RevisionRow};

/// Columns of a `media` row joined with a revision (`m` / `r` aliases).
const COLUMNS: &str = "m.id, m.uuid, m.bundle, r.revision_id, r.langcode, r.name, \
    r.media_type, r.thumbnail_target_id, r.thumbnail_alt, r.thumbnail_title, \
    r.publisher_id, r.published, r.created_at, r.changed_at, r.revision_timestamp, \
    r.revision_author_id, r.revision_log, r.fields";

/// Outcome of writing a revision of existing media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionWrite {
    Written(PersistResult),
    /// The stored `changed_at` is newer than the expected token, or the
    /// revision to update in place is no longer current.
    Stale,
    /// The media or the revision to update does not exist.
    Missing,
}

pub struct MediaRepo;

impl MediaRepo {
    /// The current revision of media `id`.
    pub async fn find_current(pool: &PgPool, id: DbId) -> Result<Option<MediaRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM media m \
             JOIN media_revisions r ON r.revision_id = m.revision_id \
             WHERE m.id = $1"
        );
        sqlx::query_as::<_, MediaRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Revisions of media `id`, newest first.
    pub async fn list_revisions(pool: &PgPool, id: DbId) -> Result<Vec<RevisionRow>, sqlx::Error> {
        sqlx::query_as::<_, RevisionRow>(
            "SELECT r.revision_id, r.name, r.revision_author_id, r.revision_timestamp, \
                r.revision_log, (r.revision_id = m.revision_id) AS is_current \
             FROM media_revisions r \
             JOIN media m ON m.id = r.media_id \
             WHERE r.media_id = $1 \
             ORDER BY r.revision_id DESC",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// Insert new media with its first revision.
    pub async fn create(
        pool: &PgPool,
        media: &Media,
        record: &RevisionRecord,
    ) -> Result<PersistResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) =
            sqlx::query_as("INSERT INTO media (uuid, bundle) VALUES ($1, $2) RETURNING id")
                .bind(media.uuid)
                .bind(&media.bundle)
                .fetch_one(&mut *tx)
                .await?;

        let revision_id = insert_revision(&mut tx, id, media, record).await?;

        sqlx::query("UPDATE media SET revision_id = $2 WHERE id = $1")
            .bind(id)
            .bind(revision_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PersistResult { id, revision_id })
    }

    /// Write `media` as a new revision or over its current revision.
    ///
    /// The media row is locked for the duration of the transaction and the
    /// write only happens if the stored `changed_at` is not newer than
    /// `expected_changed`. In-place updates must target the current revision.
    pub async fn save_revision(
        pool: &PgPool,
        id: DbId,
        media: &Media,
        record: &RevisionRecord,
        expected_changed: Option<Timestamp>,
    ) -> Result<RevisionWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let stored: Option<(DbId, Option<Timestamp>)> = sqlx::query_as(
            "SELECT m.revision_id, r.changed_at FROM media m \
             JOIN media_revisions r ON r.revision_id = m.revision_id \
             WHERE m.id = $1 \
             FOR UPDATE OF m",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((current_revision, stored_changed)) = stored else {
            return Ok(RevisionWrite::Missing);
        };
        if let (Some(stored), Some(expected)) = (stored_changed, expected_changed) {
            if stored > expected {
                return Ok(RevisionWrite::Stale);
            }
        }

        let revision_id = if media.is_new_revision() {
            let revision_id = insert_revision(&mut tx, id, media, record).await?;
            sqlx::query("UPDATE media SET revision_id = $2 WHERE id = $1")
                .bind(id)
                .bind(revision_id)
                .execute(&mut *tx)
                .await?;
            revision_id
        } else {
            // Only the current revision may be updated in place.
            if media.revision_id.is_some_and(|r| r != current_revision) {
                return Ok(RevisionWrite::Stale);
            }
            if !update_revision(&mut tx, id, current_revision, media, record).await? {
                return Ok(RevisionWrite::Missing);
            }
            current_revision
        };

        tx.commit().await?;
        Ok(RevisionWrite::Written(PersistResult { id, revision_id }))
    }
}

async fn insert_revision(
    conn: &mut PgConnection,
    media_id: DbId,
    media: &Media,
    record: &RevisionRecord,
) -> Result<DbId, sqlx::Error> {
    let thumbnail = media.thumbnail.as_ref();
    let (revision_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO media_revisions (\
            media_id, langcode, name, media_type, \
            thumbnail_target_id, thumbnail_alt, thumbnail_title, \
            publisher_id, published, created_at, changed_at, \
            revision_timestamp, revision_author_id, revision_log, fields\
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         RETURNING revision_id",
    )
    .bind(media_id)
    .bind(&media.langcode)
    .bind(&media.name)
    .bind(&media.media_type)
    .bind(thumbnail.map(|t| t.target_id))
    .bind(thumbnail.map(|t| t.alt.as_str()))
    .bind(thumbnail.map(|t| t.title.as_str()))
    .bind(media.publisher_id)
    .bind(media.published)
    .bind(media.created_at)
    .bind(media.changed_at)
    .bind(record.revision_timestamp)
    .bind(record.revision_author_id)
    .bind(record.revision_log.as_deref())
    .bind(Value::Object(media.fields.clone()))
    .fetch_one(conn)
    .await?;
    Ok(revision_id)
}

/// Returns `false` when no revision `revision_id` of media `media_id` exists.
async fn update_revision(
    conn: &mut PgConnection,
    media_id: DbId,
    revision_id: DbId,
    media: &Media,
    record: &RevisionRecord,
) -> Result<bool, sqlx::Error> {
    let thumbnail = media.thumbnail.as_ref();
    let result = sqlx::query(
        "UPDATE media_revisions SET \
            langcode = $3, name = $4, media_type = $5, \
            thumbnail_target_id = $6, thumbnail_alt = $7, thumbnail_title = $8, \
            publisher_id = $9, published = $10, created_at = $11, changed_at = $12, \
            revision_timestamp = $13, revision_author_id = $14, revision_log = $15, \
            fields = $16 \
         WHERE revision_id = $2 AND media_id = $1",
    )
    .bind(media_id)
    .bind(revision_id)
    .bind(&media.langcode)
    .bind(&media.name)
    .bind(&media.media_type)
    .bind(thumbnail.map(|t| t.target_id))
    .bind(thumbnail.map(|t| t.alt.as_str()))
    .bind(thumbnail.map(|t| t.title.as_str()))
    .bind(media.publisher_id)
    .bind(media.published)
    .bind(media.created_at)
    .bind(media.changed_at)
    .bind(record.revision_timestamp)
    .bind(record.revision_author_id)
    .bind(record.revision_log.as_deref())
    .bind(Value::Object(media.fields.clone()))
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
