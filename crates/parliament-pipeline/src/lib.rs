//! Detection, scraping, transcription, summarization and publishing
//! pipeline for parliamentary debates.
//!
//! [`orchestrator`] owns the stage dispatch and retry policy; [`stages`]
//! holds the per-stage implementations (pollers, Hansard scraper, media
//! ingestion, speech recognition, speaker/contribution extraction, vote
//! extraction, summarization, categorization, and forum publishing).

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod stages;

pub use config::Config;
pub use error::StageError;
pub use orchestrator::{ChainRunner, PipelineContext, Stage, retry_backoff, stages_for};

use std::sync::Arc;

use parliament_core::DebateStatus;

/// Builds the [`ChainRunner`] wired with every stage in the union status
/// vocabulary (spec §6, §9): both the transcript-first and audio-first
/// chains share one runner, since `stages_for` already resolves which
/// subset applies to a given debate.
#[must_use]
pub fn default_chain_runner() -> ChainRunner {
    ChainRunner::new(vec![
        (DebateStatus::ScrapingHansard, Arc::new(stages::hansard_scraper::HansardScraperStage) as Arc<dyn Stage>),
        (DebateStatus::Ingesting, Arc::new(stages::ingest::IngestStage) as Arc<dyn Stage>),
        (DebateStatus::Transcribing, Arc::new(stages::transcribe::TranscribeStage) as Arc<dyn Stage>),
        (DebateStatus::Processing, Arc::new(stages::process::ProcessStage) as Arc<dyn Stage>),
        (DebateStatus::Summarizing, Arc::new(stages::summarizer::SummarizeStage) as Arc<dyn Stage>),
        (DebateStatus::Categorizing, Arc::new(stages::categorizer::CategorizeStage) as Arc<dyn Stage>),
        (DebateStatus::Publishing, Arc::new(stages::forum_publisher::PublishStage) as Arc<dyn Stage>),
    ])
}
