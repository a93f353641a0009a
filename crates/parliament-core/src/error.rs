//! Core domain error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid status value: {0}")]
    InvalidStatus(String),

    #[error("invalid session kind: {0}")]
    InvalidSessionKind(String),

    #[error("invalid topic slug: {0}")]
    InvalidTopicSlug(String),

    #[error("invalid vote result: {0}")]
    InvalidVoteResult(String),

    #[error("invalid source url kind: {0}")]
    InvalidSourceUrlKind(String),

    #[error("legislature not found: {0}")]
    LegislatureNotFound(String),

    #[error("debate not found: {0}")]
    DebateNotFound(String),

    #[error("no media source available for debate {0}")]
    NoMediaSource(String),

    #[error("illegal stage transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}
