//! Manual poll trigger — the same entry point the worker loop calls on its
//! timer (spec §6 `/api/poll`), exposed as a one-shot CLI command.

use color_eyre::eyre::Result;
use parliament_db::Database;
use parliament_pipeline::stages::{poll_all_sources, poll_single_source};
use parliament_pipeline::{Config, PipelineContext, default_chain_runner};

pub async fn run(config: Config, legislature_code: Option<String>) -> Result<()> {
    let db = Database::connect(config.database_url()).await?;
    let ctx = PipelineContext::new(db, config);
    let runner = default_chain_runner();

    let results = match legislature_code {
        Some(code) => vec![poll_single_source(&ctx, &runner, &code).await?],
        None => poll_all_sources(&ctx, &runner).await,
    };

    for result in &results {
        println!(
            "{}: found {}, new {}{}",
            result.legislature_code,
            result.debates_found,
            result.debates_new,
            if result.errors.is_empty() { String::new() } else { format!(", errors: {:?}", result.errors) }
        );
    }

    Ok(())
}
