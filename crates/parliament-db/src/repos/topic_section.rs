//! Topic section repository

use parliament_core::TopicSection;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct TopicSectionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TopicSectionRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace all topic sections for a debate (delete-then-insert).
    ///
    /// # Errors
    /// Returns `DbError` if the transaction fails.
    pub async fn replace_for_debate(&self, debate_id: Uuid, sections: &[TopicSection]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM topic_sections WHERE debate_id = $1")
            .bind(debate_id)
            .execute(&mut *tx)
            .await?;

        for section in sections {
            sqlx::query(
                r"
                INSERT INTO topic_sections (
                    id, debate_id, title, external_topic_id, section_label,
                    speech_count, speaker_count, parties, sequence_order, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(section.id)
            .bind(section.debate_id)
            .bind(&section.title)
            .bind(&section.external_topic_id)
            .bind(&section.section_label)
            .bind(section.speech_count)
            .bind(section.speaker_count)
            .bind(&section.parties)
            .bind(section.sequence_order)
            .bind(section.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_for_debate(&self, debate_id: Uuid) -> Result<Vec<TopicSection>, DbError> {
        let rows = sqlx::query_as::<_, TopicSection>(
            "SELECT * FROM topic_sections WHERE debate_id = $1 ORDER BY sequence_order",
        )
        .bind(debate_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
