//! Media asset repository

use parliament_core::MediaAsset;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct MediaAssetRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MediaAssetRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    /// Returns `DbError` if the insert fails.
    pub async fn create(&self, asset: &MediaAsset) -> Result<(), DbError> {
        sqlx::query(
            r"
            INSERT INTO media_assets (
                id, debate_id, kind, source_label, original_url, local_path,
                file_size_bytes, duration_seconds, language_hint, status,
                error_message, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(asset.id)
        .bind(asset.debate_id)
        .bind(&asset.kind)
        .bind(&asset.source_label)
        .bind(&asset.original_url)
        .bind(&asset.local_path)
        .bind(asset.file_size_bytes)
        .bind(asset.duration_seconds)
        .bind(&asset.language_hint)
        .bind(&asset.status)
        .bind(&asset.error_message)
        .bind(asset.created_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_for_debate(&self, debate_id: Uuid) -> Result<Vec<MediaAsset>, DbError> {
        let rows = sqlx::query_as::<_, MediaAsset>(
            "SELECT * FROM media_assets WHERE debate_id = $1 ORDER BY created_at",
        )
        .bind(debate_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    /// Returns `DbError::NotFound` if the debate has no ready media asset.
    pub async fn get_ready(&self, debate_id: Uuid) -> Result<MediaAsset, DbError> {
        sqlx::query_as::<_, MediaAsset>(
            "SELECT * FROM media_assets WHERE debate_id = $1 AND status = 'ready' ORDER BY created_at DESC LIMIT 1",
        )
        .bind(debate_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("ready media asset for debate {debate_id}")))
    }
}
