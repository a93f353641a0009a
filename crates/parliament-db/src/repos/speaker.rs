//! Speaker repository

use chrono::Utc;
use parliament_core::Speaker;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct SpeakerRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SpeakerRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert keyed on `(debate_id, normalised_name)` (spec §4.5): on
    /// conflict, fields are last-writer-wins.
    ///
    /// # Errors
    /// Returns `DbError` if the upsert fails.
    pub async fn upsert(&self, speaker: &Speaker) -> Result<Speaker, DbError> {
        let row = sqlx::query_as::<_, Speaker>(
            r"
            INSERT INTO speakers (
                id, debate_id, display_name, normalised_name, party, riding,
                external_id, role_hint, metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (debate_id, normalised_name) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                party = EXCLUDED.party,
                riding = EXCLUDED.riding,
                external_id = EXCLUDED.external_id,
                role_hint = EXCLUDED.role_hint,
                metadata = EXCLUDED.metadata,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            ",
        )
        .bind(speaker.id)
        .bind(speaker.debate_id)
        .bind(&speaker.display_name)
        .bind(&speaker.normalised_name)
        .bind(&speaker.party)
        .bind(&speaker.riding)
        .bind(&speaker.external_id)
        .bind(&speaker.role_hint)
        .bind(sqlx::types::Json(&speaker.metadata))
        .bind(speaker.created_at)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn get_by_normalised_name(&self, debate_id: Uuid, normalised_name: &str) -> Result<Option<Speaker>, DbError> {
        let row = sqlx::query_as::<_, Speaker>(
            "SELECT * FROM speakers WHERE debate_id = $1 AND normalised_name = $2",
        )
        .bind(debate_id)
        .bind(normalised_name)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_for_debate(&self, debate_id: Uuid) -> Result<Vec<Speaker>, DbError> {
        let rows = sqlx::query_as::<_, Speaker>(
            "SELECT * FROM speakers WHERE debate_id = $1 ORDER BY display_name",
        )
        .bind(debate_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
