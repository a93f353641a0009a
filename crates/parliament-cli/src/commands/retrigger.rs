//! Manual retrigger — the CLI counterpart of `/api/retrigger`, for an
//! operator resurrecting a debate stuck in `error` without going through
//! the admin HTTP surface.

use color_eyre::eyre::Result;
use parliament_db::Database;
use parliament_pipeline::{Config, PipelineContext, default_chain_runner};
use uuid::Uuid;

pub async fn run(config: Config, debate_id: Uuid, from_stage: &str, hansard_first: bool) -> Result<()> {
    let stage = from_stage.parse()?;

    let db = Database::connect(config.database_url()).await?;
    db.debates().retrigger(debate_id, stage).await?;

    let ctx = PipelineContext::new(db, config);
    let runner = default_chain_runner();
    runner.run_chain(&ctx, debate_id, hansard_first).await?;

    println!("debate {debate_id} requeued from {from_stage}");
    Ok(())
}
