//! Database error types

use thiserror::Error;

/// Postgres SQLSTATE for a unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found: {0}")]
    NotFound(String),

    /// Unique-key conflict (e.g. `(legislature_id, external_id)` already
    /// exists). The pipeline treats this as an expected, swallow-and-continue
    /// outcome for idempotent re-detection (spec §7).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Connection refused, pool exhausted, or any other error that means the
    /// store itself is unreachable rather than the query being wrong. The
    /// pipeline treats this as retryable transient I/O (spec §7).
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Self::Conflict(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => Self::NotFound(err.to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::StoreUnavailable(err.to_string())
            }
            _ => Self::InvalidOperation(err.to_string()),
        }
    }
}

impl DbError {
    /// Whether the pipeline's retry loop should treat this as transient
    /// (spec §7: "transient I/O ... retried at stage level").
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
