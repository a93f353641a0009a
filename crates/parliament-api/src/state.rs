//! Shared application state for the admin HTTP surface.

use std::sync::Arc;

use parliament_db::Database;
use parliament_pipeline::{ChainRunner, Config, PipelineContext};

pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub pipeline: PipelineContext,
    pub runner: Arc<ChainRunner>,
}
