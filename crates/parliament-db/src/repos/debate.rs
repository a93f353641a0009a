//! Debate repository

use chrono::Utc;
use parliament_core::{Debate, DebateStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct DebateRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DebateRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new debate. Returns `DbError::Conflict` if `(legislature_id,
    /// external_id)` already exists — callers on the poller path should
    /// swallow that case (spec §7: idempotent re-detection).
    ///
    /// # Errors
    /// Returns `DbError` if the insert fails.
    pub async fn create(&self, debate: &Debate) -> Result<(), DbError> {
        sqlx::query(
            r"
            INSERT INTO debates (
                id, legislature_id, external_id, title, title_fr, sitting_date,
                session_kind, committee_name, status, retry_count, video_url,
                hansard_url, source_urls, error_message, metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ",
        )
        .bind(debate.id)
        .bind(debate.legislature_id)
        .bind(&debate.external_id)
        .bind(&debate.title)
        .bind(&debate.title_fr)
        .bind(debate.sitting_date)
        .bind(&debate.session_kind)
        .bind(&debate.committee_name)
        .bind(&debate.status)
        .bind(debate.retry_count)
        .bind(&debate.video_url)
        .bind(&debate.hansard_url)
        .bind(sqlx::types::Json(&debate.source_urls))
        .bind(&debate.error_message)
        .bind(sqlx::types::Json(&debate.metadata))
        .bind(debate.created_at)
        .bind(debate.updated_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError::NotFound` if no debate has this id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Debate, DbError> {
        sqlx::query_as::<_, Debate>("SELECT * FROM debates WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("debate {id}")))
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn get_by_external_id(&self, legislature_id: Uuid, external_id: &str) -> Result<Option<Debate>, DbError> {
        let row = sqlx::query_as::<_, Debate>(
            "SELECT * FROM debates WHERE legislature_id = $1 AND external_id = $2",
        )
        .bind(legislature_id)
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Overwrite a debate's scheduling fields in place (used by the
    /// `scheduled` → `detected` poller transition, spec §8 scenario 3).
    ///
    /// # Errors
    /// Returns `DbError` if the update fails.
    pub async fn update_scheduling_fields(&self, debate: &Debate) -> Result<(), DbError> {
        sqlx::query(
            r"
            UPDATE debates
            SET title = $2, title_fr = $3, status = $4, video_url = $5, hansard_url = $6,
                source_urls = $7, metadata = $8, updated_at = $9
            WHERE id = $1
            ",
        )
        .bind(debate.id)
        .bind(&debate.title)
        .bind(&debate.title_fr)
        .bind(&debate.status)
        .bind(&debate.video_url)
        .bind(&debate.hansard_url)
        .bind(sqlx::types::Json(&debate.source_urls))
        .bind(sqlx::types::Json(&debate.metadata))
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Write the entering status for a stage (spec §4.9 step 1).
    ///
    /// # Errors
    /// Returns `DbError` if the update fails.
    pub async fn update_status(&self, id: Uuid, status: DebateStatus) -> Result<(), DbError> {
        sqlx::query("UPDATE debates SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Atomically increment `retry_count` and record the failure. Returns the
    /// new retry count so the caller can compare against `max_retries`.
    ///
    /// # Errors
    /// Returns `DbError` if the update fails.
    pub async fn mark_error(&self, id: Uuid, message: &str) -> Result<i32, DbError> {
        let row: (i32,) = sqlx::query_as(
            r"
            UPDATE debates
            SET retry_count = retry_count + 1, error_message = $2, updated_at = $3
            WHERE id = $1
            RETURNING retry_count
            ",
        )
        .bind(id)
        .bind(message)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;
        Ok(row.0)
    }

    /// Set status to `error` with the final message (retry budget exhausted).
    ///
    /// # Errors
    /// Returns `DbError` if the update fails.
    pub async fn mark_failed(&self, id: Uuid, message: &str) -> Result<(), DbError> {
        sqlx::query(
            r"
            UPDATE debates
            SET status = $2, error_message = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(DebateStatus::Error.to_string())
        .bind(message)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Retrigger contract (spec §4.9): write `from_stage`, clear the error
    /// message. Per the documented open-question resolution, `retry_count` is
    /// left untouched.
    ///
    /// # Errors
    /// Returns `DbError` if the update fails.
    pub async fn retrigger(&self, id: Uuid, from_stage: DebateStatus) -> Result<(), DbError> {
        sqlx::query(
            r"
            UPDATE debates
            SET status = $2, error_message = NULL, updated_at = $3
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(from_stage.to_string())
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list(&self, status: Option<DebateStatus>, legislature_id: Option<Uuid>, limit: i64) -> Result<Vec<Debate>, DbError> {
        let rows = sqlx::query_as::<_, Debate>(
            r"
            SELECT * FROM debates
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR legislature_id = $2)
            ORDER BY created_at DESC
            LIMIT $3
            ",
        )
        .bind(status.map(|s| s.to_string()))
        .bind(legislature_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Aggregate counts by status, for the `/api/status` admin endpoint.
    ///
    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>, DbError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM debates GROUP BY status")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }

    /// Debates sitting in a non-terminal, non-`scheduled` status, oldest
    /// `updated_at` first — candidates for the resumption scan (spec §4.9).
    /// Scheduled debates wait on the poller, not on a stage; `published`/
    /// `error` are terminal. The caller still has to check each candidate's
    /// backoff window before resuming it.
    ///
    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn list_resumable(&self) -> Result<Vec<Debate>, DbError> {
        let rows = sqlx::query_as::<_, Debate>(
            r"
            SELECT * FROM debates
            WHERE status NOT IN ('scheduled', 'published', 'error')
            ORDER BY updated_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Most recent debates in `error` status, for the `/api/status` endpoint.
    ///
    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn recent_errors(&self, limit: i64) -> Result<Vec<Debate>, DbError> {
        let rows = sqlx::query_as::<_, Debate>(
            "SELECT * FROM debates WHERE status = 'error' ORDER BY updated_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
