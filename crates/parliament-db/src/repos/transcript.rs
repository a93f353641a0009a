//! Transcript repository

use parliament_core::Transcript;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct TranscriptRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TranscriptRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    /// Returns `DbError` if the insert fails.
    pub async fn create(&self, transcript: &Transcript) -> Result<(), DbError> {
        sqlx::query(
            r"
            INSERT INTO transcripts (
                id, debate_id, media_asset_id, language, raw_text, segments,
                model_id, avg_confidence, word_count, processing_time_seconds,
                detected_language, language_probability, audio_duration_seconds, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(transcript.id)
        .bind(transcript.debate_id)
        .bind(transcript.media_asset_id)
        .bind(&transcript.language)
        .bind(&transcript.raw_text)
        .bind(sqlx::types::Json(&transcript.segments))
        .bind(&transcript.model_id)
        .bind(transcript.avg_confidence)
        .bind(transcript.word_count)
        .bind(transcript.processing_time_seconds)
        .bind(&transcript.detected_language)
        .bind(transcript.language_probability)
        .bind(transcript.audio_duration_seconds)
        .bind(transcript.created_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_for_debate(&self, debate_id: Uuid) -> Result<Vec<Transcript>, DbError> {
        let rows = sqlx::query_as::<_, Transcript>(
            "SELECT * FROM transcripts WHERE debate_id = $1 ORDER BY language",
        )
        .bind(debate_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn get_by_language(&self, debate_id: Uuid, language: &str) -> Result<Option<Transcript>, DbError> {
        let row = sqlx::query_as::<_, Transcript>(
            "SELECT * FROM transcripts WHERE debate_id = $1 AND language = $2",
        )
        .bind(debate_id)
        .bind(language)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }
}
