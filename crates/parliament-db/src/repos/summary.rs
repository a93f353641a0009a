//! Summary repository

use parliament_core::Summary;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct SummaryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SummaryRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert keyed on `(debate_id, language)` (spec §3: one Summary per
    /// debate per language, replaced on re-run).
    ///
    /// # Errors
    /// Returns `DbError` if the upsert fails.
    pub async fn upsert(&self, summary: &Summary) -> Result<Summary, DbError> {
        let row = sqlx::query_as::<_, Summary>(
            r"
            INSERT INTO summaries (
                id, debate_id, language, summary_text, key_participants,
                key_issues, outcome_sentence, model_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (debate_id, language) DO UPDATE SET
                summary_text = EXCLUDED.summary_text,
                key_participants = EXCLUDED.key_participants,
                key_issues = EXCLUDED.key_issues,
                outcome_sentence = EXCLUDED.outcome_sentence,
                model_id = EXCLUDED.model_id
            RETURNING *
            ",
        )
        .bind(summary.id)
        .bind(summary.debate_id)
        .bind(&summary.language)
        .bind(&summary.summary_text)
        .bind(sqlx::types::Json(&summary.key_participants))
        .bind(sqlx::types::Json(&summary.key_issues))
        .bind(&summary.outcome_sentence)
        .bind(&summary.model_id)
        .bind(summary.created_at)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_for_debate(&self, debate_id: Uuid) -> Result<Vec<Summary>, DbError> {
        let rows = sqlx::query_as::<_, Summary>(
            "SELECT * FROM summaries WHERE debate_id = $1 ORDER BY language",
        )
        .bind(debate_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn get_by_language(&self, debate_id: Uuid, language: &str) -> Result<Option<Summary>, DbError> {
        let row = sqlx::query_as::<_, Summary>(
            "SELECT * FROM summaries WHERE debate_id = $1 AND language = $2",
        )
        .bind(debate_id)
        .bind(language)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }
}
