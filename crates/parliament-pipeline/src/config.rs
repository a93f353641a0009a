//! Runtime configuration for the parliament pipeline.
//!
//! Uses figment2 for layered config with precedence:
//! `defaults → config/pipeline.yaml → env vars → CLI args`, matching the
//! teacher's `Config::load` shape.

use clap::{CommandFactory, Parser, error::ErrorKind};
use figment2::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use std::path::{Path, PathBuf};

/// Pipeline configuration - supports YAML file, env vars, and CLI args
///
/// Precedence: defaults < config file < env vars < CLI args
#[serde_inline_default]
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about = "Parliament debate processing pipeline")]
pub struct Config {
    /// Path to config file
    #[arg(short, long, default_value = "config/pipeline.yaml")]
    #[serde(skip)]
    pub config_path: PathBuf,

    // === Record store ===
    /// Postgres connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    // === Broker ===
    /// Task-queue broker URL (named but not mandated to a specific product)
    #[arg(long, env = "BROKER_URL")]
    #[serde_inline_default(String::from("redis://localhost:6379/0"))]
    pub broker_url: String,

    // === LLM adapter ===
    /// API key for the summariser/categoriser LLM adapter
    #[arg(long, env = "LLM_API_KEY")]
    #[serde_inline_default(String::new())]
    pub llm_api_key: String,

    /// Chat-completion model used for summarisation
    #[arg(long, env = "LLM_SUMMARY_MODEL")]
    #[serde_inline_default(String::from("gpt-4o"))]
    pub llm_summary_model: String,

    /// Chat-completion model used for categorisation
    #[arg(long, env = "LLM_CATEGORY_MODEL")]
    #[serde_inline_default(String::from("gpt-4o-mini"))]
    pub llm_category_model: String,

    // === Speech recognition adapter ===
    /// Base URL of the external recognition service
    #[arg(long, env = "RECOGNIZER_URL")]
    #[serde_inline_default(String::from("http://localhost:8090"))]
    pub recognizer_url: String,

    /// Recognition model name requested from the adapter
    #[arg(long, env = "RECOGNIZER_MODEL")]
    #[serde_inline_default(String::from("large-v3"))]
    pub recognizer_model: String,

    /// Recognition device hint (`cpu`, `cuda`)
    #[arg(long, env = "RECOGNIZER_DEVICE")]
    #[serde_inline_default(String::from("cpu"))]
    pub recognizer_device: String,

    /// Recognition compute type hint (`int8`, `float16`, ...)
    #[arg(long, env = "RECOGNIZER_COMPUTE_TYPE")]
    #[serde_inline_default(String::from("int8"))]
    pub recognizer_compute_type: String,

    // === System identity ===
    /// Bot/system user id attributed to published forum posts
    #[arg(long, env = "SYSTEM_BOT_USER_ID")]
    #[serde_inline_default(String::new())]
    pub system_bot_user_id: String,

    // === Pipeline ===
    /// Minutes between automatic poll-all runs
    #[arg(long, env = "POLL_INTERVAL_MINUTES")]
    #[serde_inline_default(30)]
    pub poll_interval_minutes: u64,

    /// Max retries per stage before a debate moves to `error`
    #[arg(long, env = "MAX_RETRIES")]
    #[serde_inline_default(3)]
    pub max_retries: i32,

    /// Seconds between resumption scans for debates stalled mid-chain
    /// (spec §4.9). Kept well under the shortest stage backoff (60s) so a
    /// debate is picked up close to the moment it becomes due.
    #[arg(long, env = "RESUME_SCAN_INTERVAL_SECONDS")]
    #[serde_inline_default(30)]
    pub resume_scan_interval_seconds: u64,

    /// Log level passed to `tracing_subscriber::EnvFilter`
    #[arg(long, env = "LOG_LEVEL")]
    #[serde_inline_default(String::from("info"))]
    pub log_level: String,

    // === Admin API ===
    /// Shared secret compared against the `X-Api-Key` header
    #[arg(long, env = "PIPELINE_API_KEY")]
    #[serde_inline_default(String::from("change-this-to-a-secure-key"))]
    pub pipeline_api_key: String,

    // === Media storage ===
    /// Root directory for per-debate media working directories
    #[arg(long, env = "MEDIA_STORAGE_PATH")]
    #[serde_inline_default(PathBuf::from("/tmp/parliament-media"))]
    pub media_storage_path: PathBuf,
}

impl Config {
    /// Load config with layered precedence:
    /// defaults < YAML file < env vars < CLI args
    ///
    /// # Errors
    /// Returns an error if config parsing fails or validation errors occur
    pub fn load() -> color_eyre::Result<Self> {
        let cli = Self::parse();

        let config: Self = Figment::new()
            .merge(Yaml::file(&cli.config_path)) // 1. config file
            .merge(Env::raw()) // 2. env vars
            .merge(Serialized::defaults(cli)) // 3. CLI args (highest)
            .extract()?;

        config.validate();
        Ok(config)
    }

    /// Load config from a specific path (for testing or daemon command)
    ///
    /// # Errors
    /// Returns an error if config parsing fails or validation errors occur
    pub fn load_from(config_path: &Path) -> color_eyre::Result<Self> {
        let config: Self = Figment::new()
            .merge(Yaml::file(config_path))
            .merge(Env::raw())
            .extract()?;

        config.validate();
        Ok(config)
    }

    fn validate(&self) {
        if self.database_url.is_none() {
            let mut cmd = Self::command();
            cmd.error(
                ErrorKind::MissingRequiredArgument,
                "database_url is required (set via --database-url, DATABASE_URL env, or config file)",
            )
            .exit();
        }
    }

    /// # Panics
    /// Panics if `database_url` is not configured via `DATABASE_URL` env or config file
    #[expect(clippy::expect_used)]
    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database_url
            .as_deref()
            .expect("database_url is required - set via DATABASE_URL env or config file")
    }

    #[must_use]
    pub fn media_storage_path(&self) -> &Path {
        &self.media_storage_path
    }
}
