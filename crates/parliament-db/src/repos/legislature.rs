//! Legislature repository

use parliament_core::Legislature;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct LegislatureRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LegislatureRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    /// Returns `DbError` if the insert fails.
    pub async fn create(&self, legislature: &Legislature) -> Result<(), DbError> {
        sqlx::query(
            r"
            INSERT INTO legislatures (id, code, name, level, languages, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(legislature.id)
        .bind(&legislature.code)
        .bind(&legislature.name)
        .bind(legislature.level)
        .bind(&legislature.languages)
        .bind(legislature.created_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Legislature>, DbError> {
        let row = sqlx::query_as::<_, Legislature>("SELECT * FROM legislatures WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// # Errors
    /// Returns `DbError::NotFound` if no legislature has this code.
    pub async fn get_by_code(&self, code: &str) -> Result<Legislature, DbError> {
        sqlx::query_as::<_, Legislature>("SELECT * FROM legislatures WHERE code = $1")
            .bind(code)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("legislature with code {code}")))
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list(&self) -> Result<Vec<Legislature>, DbError> {
        let rows = sqlx::query_as::<_, Legislature>("SELECT * FROM legislatures ORDER BY code")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }
}
