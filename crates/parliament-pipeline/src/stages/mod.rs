//! Per-stage implementations of the [`crate::Stage`] trait, plus the
//! pollers that populate new debate rows in the first place.

pub mod categorizer;
pub mod forum_publisher;
pub mod hansard_scraper;
pub mod ingest;
pub mod poll;
pub mod pollers;
pub mod post_renderer;
pub mod process;
pub mod summarizer;
pub mod transcribe;
pub mod vote_extractor;

pub use poll::{PollResult, poll_all_sources, poll_single_source, resume_stalled_debates};
