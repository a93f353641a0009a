//! Stage dispatch and the retry/advance loop (spec §4.9, §5, §7).
//!
//! `poll_task.py`'s `trigger_debate_pipeline` picks a stage list from a
//! dict keyed on status; [`ChainRunner::run_chain`] is the same dispatch
//! expressed as a `match` over [`DebateStatus`] plus the `hansard_first`
//! flag that selects which of the two chains a debate belongs to.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parliament_core::{Debate, DebateStatus};
use parliament_db::Database;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::Config;
use crate::error::StageError;

/// Shared handles every stage needs: the record store, configuration, and
/// a reqwest client reused across HTTP-backed adapters (recogniser, LLM,
/// forum). Cheap to clone — everything inside is already an `Arc`/`Pool`.
#[derive(Clone)]
pub struct PipelineContext {
    pub db: Database,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl PipelineContext {
    #[must_use]
    pub fn new(db: Database, config: Config) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("parliament-pipeline/0.1")
            .build()
            .unwrap_or_default();
        Self { db, config: Arc::new(config), http }
    }
}

/// One unit of pipeline work. Implementors perform exactly one stage's job
/// for one debate and persist whatever they produce; they do not write the
/// debate's `status` column themselves — [`ChainRunner`] owns that.
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    /// The status this stage runs under (used only for logging/metrics).
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &PipelineContext, debate_id: Uuid) -> Result<(), StageError>;
}

/// The transcript-first chain (federal and provincial Hansard-backed
/// debates): scrape the Hansard transcript directly, skip media ingestion
/// and speech recognition entirely.
fn hansard_first_chain(status: DebateStatus) -> &'static [DebateStatus] {
    use DebateStatus::{Categorizing, Detected, Processing, Publishing, ScrapingHansard, Summarizing};
    match status {
        Detected | ScrapingHansard => &[ScrapingHansard, Processing, Summarizing, Categorizing, Publishing],
        Processing => &[Processing, Summarizing, Categorizing, Publishing],
        Summarizing => &[Summarizing, Categorizing, Publishing],
        Categorizing => &[Categorizing, Publishing],
        Publishing => &[Publishing],
        _ => &[],
    }
}

/// The audio-first chain (legacy video-only sources with no structured
/// transcript): download media, run the recogniser, then converge onto the
/// same process/summarize/publish tail as the transcript-first chain.
fn audio_first_chain(status: DebateStatus) -> &'static [DebateStatus] {
    use DebateStatus::{Categorizing, Detected, Ingesting, Processing, Publishing, Summarizing, Transcribing};
    match status {
        Detected | Ingesting => &[Ingesting, Transcribing, Processing, Summarizing, Categorizing, Publishing],
        Transcribing => &[Transcribing, Processing, Summarizing, Categorizing, Publishing],
        Processing => &[Processing, Summarizing, Categorizing, Publishing],
        Summarizing => &[Summarizing, Categorizing, Publishing],
        Categorizing => &[Categorizing, Publishing],
        Publishing => &[Publishing],
        _ => &[],
    }
}

/// The remaining stage list for a (status, chain) pair. An empty slice means
/// there is nothing left to run — the caller should treat this as a no-op,
/// matching the Python `trigger_debate_pipeline`'s "no tasks to run" log line.
#[must_use]
pub fn stages_for(status: DebateStatus, hansard_first: bool) -> &'static [DebateStatus] {
    if hansard_first { hansard_first_chain(status) } else { audio_first_chain(status) }
}

/// Fixed backoff before an automatic in-place retry of the stage that just
/// failed (spec §4.9). Grounded in the Python original's per-task
/// `default_retry_delay`: 120s for the two stages that talk to a remote site
/// directly (`scrape_hansard_task`, `transcribe_task`), 60s for the rest.
#[must_use]
pub const fn retry_backoff(status: DebateStatus) -> Duration {
    match status {
        DebateStatus::ScrapingHansard | DebateStatus::Transcribing => Duration::from_secs(120),
        _ => Duration::from_secs(60),
    }
}

/// Runs a debate through its remaining stage list, advancing the stored
/// `status` before each stage and applying the retry-or-fail policy on
/// failure (spec §7, §9: retrigger does not reset `retry_count`).
///
/// Also guards against two chains running for the same debate at once
/// ([`Self::run_chain`] is called both from the poll-reconcile path and from
/// the resumption scan, plus the admin API's retrigger/test endpoints) —
/// `in_flight` tracks debates currently being advanced by this process.
pub struct ChainRunner {
    stages: Vec<(DebateStatus, Arc<dyn Stage>)>,
    in_flight: Mutex<HashSet<Uuid>>,
}

impl ChainRunner {
    #[must_use]
    pub fn new(stages: Vec<(DebateStatus, Arc<dyn Stage>)>) -> Self {
        Self { stages, in_flight: Mutex::new(HashSet::new()) }
    }

    fn stage_for(&self, status: DebateStatus) -> Option<&Arc<dyn Stage>> {
        self.stages.iter().find(|(s, _)| *s == status).map(|(_, stage)| stage)
    }

    /// Run every remaining stage for `debate_id` starting from its current
    /// status. A non-fatal stage failure retries the same stage in place
    /// after [`retry_backoff`] rather than aborting the chain, so a transient
    /// blip recovers without any outside intervention (spec §8 scenario 4).
    /// Stops only once a stage succeeds all the way to the end, a stage
    /// fails fatally, or the retry budget is exhausted.
    ///
    /// If `debate_id` already has a chain running in this process, this is a
    /// no-op — callers that triggered it (poller reconciliation, the
    /// resumption scan, a manual retrigger) don't need to care which one won.
    ///
    /// # Errors
    /// Returns the `StageError` that exhausted the retry budget or was fatal.
    pub async fn run_chain(&self, ctx: &PipelineContext, debate_id: Uuid, hansard_first: bool) -> Result<(), StageError> {
        if !self.in_flight.lock().await.insert(debate_id) {
            info!(%debate_id, "chain already running for this debate in this process, skipping");
            return Ok(());
        }

        let result = self.run_chain_inner(ctx, debate_id, hansard_first).await;
        self.in_flight.lock().await.remove(&debate_id);
        result
    }

    async fn run_chain_inner(&self, ctx: &PipelineContext, debate_id: Uuid, hansard_first: bool) -> Result<(), StageError> {
        let debate = ctx.db.debates().get_by_id(debate_id).await?;
        let remaining = stages_for(debate.status(), hansard_first);

        if remaining.is_empty() {
            info!(%debate_id, status = %debate.status(), "no stages to run");
            return Ok(());
        }

        for &status in remaining {
            self.run_one(ctx, &debate, status).await?;
        }
        Ok(())
    }

    /// Runs one stage, retrying it in place on non-fatal failure until it
    /// succeeds, a fatal error is hit, or the retry budget runs out.
    async fn run_one(&self, ctx: &PipelineContext, debate: &Debate, status: DebateStatus) -> Result<(), StageError> {
        let Some(stage) = self.stage_for(status) else {
            warn!(debate_id = %debate.id, %status, "no stage registered for status, skipping");
            return Ok(());
        };

        ctx.db.debates().update_status(debate.id, status).await?;
        info!(debate_id = %debate.id, stage = stage.name(), "entering stage");

        loop {
            match stage.run(ctx, debate.id).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_fatal() => {
                    error!(debate_id = %debate.id, stage = stage.name(), error = %err, "stage failed fatally");
                    if let Err(db_err) = ctx.db.debates().mark_failed(debate.id, &err.to_string()).await {
                        error!(debate_id = %debate.id, error = %db_err, "failed to record fatal stage failure");
                    }
                    return Err(err);
                }
                Err(err) => {
                    error!(debate_id = %debate.id, stage = stage.name(), error = %err, "stage failed");
                    match ctx.db.debates().mark_error(debate.id, &err.to_string()).await {
                        Ok(retry_count) if retry_count >= ctx.config.max_retries => {
                            let message = format!("Max retries exceeded. Last error: {err}");
                            if let Err(db_err) = ctx.db.debates().mark_failed(debate.id, &message).await {
                                error!(debate_id = %debate.id, error = %db_err, "failed to record exhausted retry budget");
                            }
                            return Err(err);
                        }
                        Ok(retry_count) => {
                            let backoff = retry_backoff(status);
                            warn!(
                                debate_id = %debate.id,
                                stage = stage.name(),
                                retry_count,
                                max = ctx.config.max_retries,
                                backoff_secs = backoff.as_secs(),
                                "stage failed, retrying after backoff"
                            );
                            tokio::time::sleep(backoff).await;
                        }
                        Err(db_err) => {
                            error!(debate_id = %debate.id, error = %db_err, "failed to record stage failure");
                            return Err(err);
                        }
                    }
                }
            }
        }
    }
}
