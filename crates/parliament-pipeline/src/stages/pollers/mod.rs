//! Source pollers: discover newly-sitting debates per legislature.
//!
//! Grounded in `poll_task.py`'s `poll_single_source`/`get_poller` dispatch:
//! one [`Poller`] per legislature code, each returning a list of candidate
//! sittings that the caller reconciles against `debates.external_id`.

pub mod federal;
pub mod ontario;
pub mod quebec;

use async_trait::async_trait;
use chrono::NaiveDate;
use parliament_core::{DebateStatus, SessionKind, SourceUrl};

use crate::error::StageError;

/// One detected sitting, before it has been reconciled into a `Debate` row.
/// `external_id` is the idempotency key the caller checks against existing
/// rows before inserting (spec §8 scenario: idempotent re-detection).
#[derive(Debug, Clone)]
pub struct CandidateSitting {
    pub external_id: String,
    pub title: String,
    pub title_fr: Option<String>,
    pub sitting_date: NaiveDate,
    pub session_kind: SessionKind,
    /// Whether this sitting already has a transcript to scrape (`detected`)
    /// or is merely on the calendar with nothing published yet
    /// (`scheduled`) — mirrors the status field the Python poller returns
    /// directly in its debate dict.
    pub status_hint: DebateStatus,
    pub video_url: Option<String>,
    pub hansard_url: Option<String>,
    pub source_urls: Vec<SourceUrl>,
    pub metadata: serde_json::Value,
}

/// Discovers candidate sittings for one legislature. Implementors return an
/// empty `Vec` rather than erroring when a source is temporarily unreachable
/// in a way that is expected to resolve on the next poll (a transient
/// network failure still bubbles up as [`StageError::Transient`]).
#[async_trait]
pub trait Poller: Send + Sync {
    fn legislature_code(&self) -> &'static str;

    async fn detect_new_debates(&self, http: &reqwest::Client) -> Result<Vec<CandidateSitting>, StageError>;
}

/// Look up the poller for a legislature code (spec: `CA`, `ON`, `QC`).
/// Returns `None` for unrecognised codes — the caller treats that as "no
/// poller configured" rather than an error, since legislatures can be added
/// to the `legislatures` table ahead of their poller shipping.
#[must_use]
pub fn poller_for(code: &str) -> Option<Box<dyn Poller>> {
    match code {
        "CA" => Some(Box::new(federal::FederalPoller)),
        "ON" => Some(Box::new(ontario::OntarioPoller)),
        "QC" => Some(Box::new(quebec::QuebecPoller)),
        _ => None,
    }
}

/// All legislature codes the pipeline knows how to poll, in dispatch order.
pub const LEGISLATURE_CODES: &[&str] = &["CA", "ON", "QC"];
