//! Stage error taxonomy (spec §7).
//!
//! Every stage handler returns a `StageError`. The orchestrator matches on
//! the variant, not the message, to decide whether a failure consumes the
//! debate's retry budget or fails fast to the terminal `error` status.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    /// Network blip, timeout, store unavailable — worth retrying as-is.
    #[error("transient: {0}")]
    Transient(String),

    /// An upstream record the stage depends on (media asset, transcript,
    /// Hansard data) hasn't shown up yet.
    #[error("data missing: {0}")]
    DataMissing(String),

    /// The stage's own invariant was violated (malformed payload it cannot
    /// recover from without a code change).
    #[error("contract violation: {0}")]
    Contract(String),

    /// Fatal configuration problem (missing API key, unparseable URL). Skips
    /// the retry budget and moves straight to `error`.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl StageError {
    /// Fatal errors bypass the retry budget (spec §7: "fatal configuration
    /// errors fail fast ... and move to error").
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

impl From<parliament_db::DbError> for StageError {
    fn from(err: parliament_db::DbError) -> Self {
        if err.is_retryable() {
            Self::Transient(err.to_string())
        } else {
            Self::Contract(err.to_string())
        }
    }
}

impl From<reqwest::Error> for StageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transient(err.to_string())
    }
}

impl From<serde_json::Error> for StageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Contract(err.to_string())
    }
}
