//! Poll-and-reconcile: the entry point that turns [`super::pollers`] output
//! into `debates` rows and auto-triggers the pipeline for recent sittings.
//!
//! Grounded in `poll_task.py`'s `poll_single_source`/`poll_all_sources`.

use chrono::{Duration, Utc};
use parliament_core::{Debate, DebateStatus};
use serde::Serialize;
use uuid::Uuid;

use super::pollers::{self, poller_for};
use crate::error::StageError;
use crate::orchestrator::{ChainRunner, PipelineContext, retry_backoff};

/// Outcome of polling one legislature (spec: mirrors `PollResult`).
#[derive(Debug, Clone, Serialize)]
pub struct PollResult {
    pub legislature_code: String,
    pub debates_found: usize,
    pub debates_new: usize,
    pub errors: Vec<String>,
}

/// Poll every configured legislature, continuing past a single source's
/// failure (spec: `poll_all_sources` catches per-code errors into the
/// result list rather than aborting the whole run).
pub async fn poll_all_sources(ctx: &PipelineContext, runner: &ChainRunner) -> Vec<PollResult> {
    let mut results = Vec::with_capacity(pollers::LEGISLATURE_CODES.len());
    for &code in pollers::LEGISLATURE_CODES {
        match poll_single_source(ctx, runner, code).await {
            Ok(result) => results.push(result),
            Err(err) => results.push(PollResult {
                legislature_code: code.to_string(),
                debates_found: 0,
                debates_new: 0,
                errors: vec![err.to_string()],
            }),
        }
    }
    results
}

/// Poll one legislature and reconcile detected sittings against existing
/// rows, auto-triggering the pipeline for debates dated today or within the
/// last two days (spec: older debates are left for the next scheduled poll).
///
/// # Errors
/// Returns `StageError` if the legislature is unknown or the poller itself
/// fails outright (network errors bubble up per-sitting rather than
/// aborting the whole legislature where possible).
pub async fn poll_single_source(ctx: &PipelineContext, runner: &ChainRunner, legislature_code: &str) -> Result<PollResult, StageError> {
    let legislature = ctx.db.legislatures().get_by_code(legislature_code).await?;
    let poller = poller_for(legislature_code).ok_or_else(|| StageError::Fatal(format!("no poller registered for {legislature_code}")))?;

    let detected = poller.detect_new_debates(&ctx.http).await?;
    let is_federal = legislature_code == "CA";
    let today = Utc::now().date_naive();
    let mut new_count = 0usize;

    for candidate in &detected {
        let existing = ctx.db.debates().get_by_external_id(legislature.id, &candidate.external_id).await?;

        match existing {
            Some(existing) if existing.status() == DebateStatus::Scheduled && candidate.status_hint == DebateStatus::Detected => {
                let mut updated = existing.clone();
                updated.title.clone_from(&candidate.title);
                updated.title_fr.clone_from(&candidate.title_fr);
                updated.status = DebateStatus::Detected.to_string();
                updated.hansard_url.clone_from(&candidate.hansard_url);
                updated.video_url.clone_from(&candidate.video_url);
                updated.source_urls.clone_from(&candidate.source_urls);
                updated.metadata = candidate.metadata.clone();
                ctx.db.debates().update_scheduling_fields(&updated).await?;

                tracing::info!(debate_id = %updated.id, "scheduled debate now detected, triggering pipeline");
                trigger(ctx, runner, updated.id, is_federal).await;
                new_count += 1;
            }
            Some(_) => {}
            None => {
                let debate = Debate {
                    id: Uuid::now_v7(),
                    legislature_id: legislature.id,
                    external_id: candidate.external_id.clone(),
                    title: candidate.title.clone(),
                    title_fr: candidate.title_fr.clone(),
                    sitting_date: candidate.sitting_date,
                    session_kind: candidate.session_kind.to_string(),
                    committee_name: candidate
                        .metadata
                        .get("committee_code")
                        .and_then(|v| v.as_str())
                        .map(ToString::to_string),
                    status: candidate.status_hint.to_string(),
                    retry_count: 0,
                    video_url: candidate.video_url.clone(),
                    hansard_url: candidate.hansard_url.clone(),
                    source_urls: candidate.source_urls.clone(),
                    error_message: None,
                    metadata: candidate.metadata.clone(),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                };

                match ctx.db.debates().create(&debate).await {
                    Ok(()) => {
                        new_count += 1;
                        tracing::info!(debate_id = %debate.id, title = %debate.title, status = %candidate.status_hint, "new debate detected");

                        if candidate.status_hint == DebateStatus::Detected && today - candidate.sitting_date <= Duration::days(2) {
                            trigger(ctx, runner, debate.id, is_federal).await;
                        }
                    }
                    Err(parliament_db::DbError::Conflict(_)) => {
                        tracing::debug!(external_id = %candidate.external_id, "debate already exists (race with concurrent poll)");
                    }
                    Err(db_err) => return Err(db_err.into()),
                }
            }
        }
    }

    Ok(PollResult {
        legislature_code: legislature_code.to_string(),
        debates_found: detected.len(),
        debates_new: new_count,
        errors: Vec::new(),
    })
}

async fn trigger(ctx: &PipelineContext, runner: &ChainRunner, debate_id: Uuid, hansard_first: bool) {
    if let Err(err) = runner.run_chain(ctx, debate_id, hansard_first).await {
        tracing::error!(%debate_id, error = %err, "auto-triggered pipeline run failed");
    }
}

/// Resumes debates left mid-chain past their stage's backoff window (spec
/// §4.9, §8 scenario 4). `run_one`'s in-place retry already covers the
/// common case of a transient failure recovering within the same
/// `run_chain` call; this scan exists for the case that call never finishes
/// — a worker restart, or a process that crashed mid-stage — leaving a
/// debate sitting in a non-terminal, non-`scheduled` status with nothing
/// watching it. `ChainRunner::run_chain`'s own de-duplication makes it safe
/// to call this concurrently with the poller: a debate a chain is still
/// legitimately working on is skipped rather than restarted.
///
/// Returns the number of debates resumed.
pub async fn resume_stalled_debates(ctx: &PipelineContext, runner: &ChainRunner) -> usize {
    let candidates = match ctx.db.debates().list_resumable().await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(error = %err, "resume scan: failed to list resumable debates");
            return 0;
        }
    };

    let now = Utc::now();
    let mut resumed = 0usize;

    for debate in candidates {
        let status = debate.status();
        let due_at = debate.updated_at + chrono::Duration::from_std(retry_backoff(status)).unwrap_or(Duration::seconds(60));
        if now < due_at {
            continue;
        }

        let legislature = match ctx.db.legislatures().get_by_id(debate.legislature_id).await {
            Ok(Some(legislature)) => legislature,
            Ok(None) => {
                tracing::warn!(debate_id = %debate.id, "resume scan: legislature not found, skipping");
                continue;
            }
            Err(err) => {
                tracing::warn!(debate_id = %debate.id, error = %err, "resume scan: failed to load legislature");
                continue;
            }
        };

        tracing::info!(debate_id = %debate.id, %status, "resuming stalled debate");
        resumed += 1;
        trigger(ctx, runner, debate.id, legislature.is_federal()).await;
    }

    resumed
}
