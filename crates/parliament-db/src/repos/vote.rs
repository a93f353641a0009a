//! Vote repository

use parliament_core::Vote;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct VoteRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> VoteRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace all votes for a debate (delete-then-insert).
    ///
    /// # Errors
    /// Returns `DbError` if the transaction fails.
    pub async fn replace_for_debate(&self, debate_id: Uuid, votes: &[Vote]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM votes WHERE debate_id = $1")
            .bind(debate_id)
            .execute(&mut *tx)
            .await?;

        for vote in votes {
            sqlx::query(
                r"
                INSERT INTO votes (
                    id, debate_id, motion_text, motion_text_secondary, bill_number,
                    yea_count, nay_count, paired_count, abstain_count, result,
                    source_id, member_votes, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ",
            )
            .bind(vote.id)
            .bind(vote.debate_id)
            .bind(&vote.motion_text)
            .bind(&vote.motion_text_secondary)
            .bind(&vote.bill_number)
            .bind(vote.yea_count)
            .bind(vote.nay_count)
            .bind(vote.paired_count)
            .bind(vote.abstain_count)
            .bind(&vote.result)
            .bind(&vote.source_id)
            .bind(vote.member_votes.as_ref().map(sqlx::types::Json))
            .bind(vote.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_for_debate(&self, debate_id: Uuid) -> Result<Vec<Vote>, DbError> {
        let rows = sqlx::query_as::<_, Vote>("SELECT * FROM votes WHERE debate_id = $1 ORDER BY created_at")
            .bind(debate_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }
}
