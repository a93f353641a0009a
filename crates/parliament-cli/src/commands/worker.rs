//! The long-running worker process: polls every configured legislature on a
//! fixed interval and runs each newly-detected (or resumed) debate through
//! its chain (spec §5, §6 "one timer fires the poll-all-sources task every
//! N minutes"). A second, shorter-interval timer resumes any debate left
//! mid-chain past its stage's backoff window (spec §4.9), so a stalled
//! debate recovers without an operator having to hit `/api/retrigger`.
//!
//! Grounded in `poll_task.py`'s Celery beat schedule — here a plain
//! `tokio::time::interval` plays the same role without an external broker
//! dependency for scheduling itself.

use std::time::Duration;

use color_eyre::eyre::Result;
use parliament_db::Database;
use parliament_pipeline::stages::{poll_all_sources, resume_stalled_debates};
use parliament_pipeline::{Config, PipelineContext, default_chain_runner};
use tokio::time::interval;

pub async fn run(config: Config) -> Result<()> {
    let poll_interval = Duration::from_secs(config.poll_interval_minutes * 60);
    let resume_interval = Duration::from_secs(config.resume_scan_interval_seconds);
    let db = Database::connect(config.database_url()).await?;
    let ctx = PipelineContext::new(db, config);
    let runner = default_chain_runner();

    tracing::info!(
        poll_interval_secs = poll_interval.as_secs(),
        resume_interval_secs = resume_interval.as_secs(),
        "worker starting"
    );

    let mut poll_ticker = interval(poll_interval);
    let mut resume_ticker = interval(resume_interval);
    loop {
        tokio::select! {
            _ = poll_ticker.tick() => {
                tracing::info!("running scheduled poll");
                let results = poll_all_sources(&ctx, &runner).await;
                for result in &results {
                    if !result.errors.is_empty() {
                        tracing::warn!(legislature = %result.legislature_code, errors = ?result.errors, "poll completed with errors");
                    }
                    tracing::info!(
                        legislature = %result.legislature_code,
                        found = result.debates_found,
                        new = result.debates_new,
                        "poll result"
                    );
                }
            }
            _ = resume_ticker.tick() => {
                let resumed = resume_stalled_debates(&ctx, &runner).await;
                if resumed > 0 {
                    tracing::info!(resumed, "resume scan complete");
                }
            }
        }
    }
}
