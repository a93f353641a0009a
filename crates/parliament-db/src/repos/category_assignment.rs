//! Category assignment repository

use parliament_core::CategoryAssignment;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct CategoryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace all category assignments for a debate (delete-then-insert).
    /// Exactly one row in `assignments` must have `is_primary = true`; that
    /// invariant is the categoriser's responsibility, not this repo's.
    ///
    /// # Errors
    /// Returns `DbError` if the transaction fails.
    pub async fn replace_for_debate(&self, debate_id: Uuid, assignments: &[CategoryAssignment]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM category_assignments WHERE debate_id = $1")
            .bind(debate_id)
            .execute(&mut *tx)
            .await?;

        for assignment in assignments {
            sqlx::query(
                r"
                INSERT INTO category_assignments (
                    id, debate_id, topic_slug, confidence, is_primary, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(assignment.id)
            .bind(assignment.debate_id)
            .bind(&assignment.topic_slug)
            .bind(assignment.confidence)
            .bind(assignment.is_primary)
            .bind(assignment.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_for_debate(&self, debate_id: Uuid) -> Result<Vec<CategoryAssignment>, DbError> {
        let rows = sqlx::query_as::<_, CategoryAssignment>(
            "SELECT * FROM category_assignments WHERE debate_id = $1 ORDER BY confidence DESC",
        )
        .bind(debate_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    /// Returns `DbError::NotFound` if no primary category has been assigned.
    pub async fn get_primary(&self, debate_id: Uuid) -> Result<CategoryAssignment, DbError> {
        sqlx::query_as::<_, CategoryAssignment>(
            "SELECT * FROM category_assignments WHERE debate_id = $1 AND is_primary = true",
        )
        .bind(debate_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("primary category for debate {debate_id}")))
    }
}
