//! Worker process and operator CLI for the parliament debate pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use parliament_pipeline::Config;
use uuid::Uuid;

mod cli;
mod commands;

#[derive(Parser)]
#[command(name = "parliament-cli")]
#[command(about = "Worker process and operator CLI for the parliament debate pipeline")]
#[command(version)]
#[command(styles = cli::get_styles())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version information
    Version,

    /// Run the long-lived worker: polls every legislature on a fixed
    /// interval and advances each debate through its chain
    Worker,

    /// Seed the `legislatures` table (CA, ON, QC)
    Seed,

    /// Trigger a one-shot poll run, optionally for a single legislature
    Poll {
        /// Restrict to a single legislature code (e.g. `CA`)
        #[arg(long)]
        legislature: Option<String>,
    },

    /// Show aggregate debate counts by stage and recent errors
    Status,

    /// Resume a debate stuck in `error` from a given stage
    Retrigger {
        /// Debate id to resume
        debate_id: Uuid,

        /// Status to resume from (e.g. `processing`)
        from_stage: String,

        /// Resume the transcript-first chain instead of audio-first
        #[arg(long)]
        hansard: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Version doesn't need configuration loaded; everything else does.
    if matches!(cli.command, Commands::Version) {
        println!("parliament-cli {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // This binary owns argv for its own subcommand parsing above, so
    // `Config` is loaded from YAML + env only (`Config::load` would try to
    // parse the same argv again against its own CLI shape and collide).
    let config_path = std::env::var("PARLIAMENT_CONFIG").map_or_else(|_| PathBuf::from("config/pipeline.yaml"), PathBuf::from);
    let config = Config::load_from(&config_path)?;
    tracing_subscriber::fmt().with_env_filter(config.log_level.clone()).init();

    match cli.command {
        Commands::Version => unreachable!("handled above"),
        Commands::Worker => commands::worker::run(config).await?,
        Commands::Seed => commands::seed::run(config.database_url()).await?,
        Commands::Poll { legislature } => commands::poll::run(config, legislature).await?,
        Commands::Status => commands::status::run(config.database_url()).await?,
        Commands::Retrigger { debate_id, from_stage, hansard } => {
            commands::retrigger::run(config, debate_id, &from_stage, hansard).await?;
        }
    }

    Ok(())
}
