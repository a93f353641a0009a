//! Contribution repository

use parliament_core::Contribution;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct ContributionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ContributionRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace all contributions for a debate in one transaction
    /// (delete-then-insert, spec §3: "on re-run, records are replaced").
    ///
    /// # Errors
    /// Returns `DbError` if the transaction fails.
    pub async fn replace_for_debate(&self, debate_id: Uuid, contributions: &[Contribution]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM contributions WHERE debate_id = $1")
            .bind(debate_id)
            .execute(&mut *tx)
            .await?;

        for contribution in contributions {
            sqlx::query(
                r"
                INSERT INTO contributions (
                    id, debate_id, speaker_id, raw_speaker_label, text, text_secondary,
                    start_seconds, end_seconds, sequence_order, metadata, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ",
            )
            .bind(contribution.id)
            .bind(contribution.debate_id)
            .bind(contribution.speaker_id)
            .bind(&contribution.raw_speaker_label)
            .bind(&contribution.text)
            .bind(&contribution.text_secondary)
            .bind(contribution.start_seconds)
            .bind(contribution.end_seconds)
            .bind(contribution.sequence_order)
            .bind(sqlx::types::Json(&contribution.metadata))
            .bind(contribution.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_for_debate(&self, debate_id: Uuid) -> Result<Vec<Contribution>, DbError> {
        let rows = sqlx::query_as::<_, Contribution>(
            "SELECT * FROM contributions WHERE debate_id = $1 ORDER BY sequence_order",
        )
        .bind(debate_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn count_for_debate(&self, debate_id: Uuid) -> Result<i64, DbError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contributions WHERE debate_id = $1")
            .bind(debate_id)
            .fetch_one(self.pool)
            .await?;
        Ok(row.0)
    }
}
