//! Admin HTTP server for the parliament debate pipeline (spec §6).

mod error;
mod middleware;
mod models;
mod routes;
mod state;

use std::sync::Arc;

use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use color_eyre::eyre::Result;
use parliament_db::Database;
use parliament_pipeline::{Config, PipelineContext, default_chain_runner};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health,
        routes::trigger_poll,
        routes::status,
        routes::list_debates,
        routes::retrigger,
        routes::test_debate,
        routes::test_hansard,
    ),
    components(schemas(
        models::HealthResponse,
        models::PollRequest,
        models::StatusResponse,
        models::DebateInfo,
        models::RetriggerRequest,
        models::RetriggerResponse,
        models::TestDebateRequest,
        models::TestHansardRequest,
        models::TestRunResponse,
    )),
    info(
        title = "Parliament Pipeline Admin API",
        description = "Operator surface for the parliamentary debate processing pipeline",
        version = "0.1.0"
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    tracing_subscriber::fmt().with_env_filter(config.log_level.clone()).init();

    let port: u16 = std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080);

    tracing::info!("connecting to record store");
    let db = Database::connect(config.database_url()).await?;

    let pipeline = PipelineContext::new(db.clone(), config.clone());
    let runner = Arc::new(default_chain_runner());

    let state = Arc::new(AppState { db, config: Arc::new(config), pipeline, runner });

    let public_routes = Router::new()
        .route("/health", get(routes::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let protected_routes = Router::new()
        .route("/api/poll", post(routes::trigger_poll))
        .route("/api/status", get(routes::status))
        .route("/api/debates", get(routes::list_debates))
        .route("/api/retrigger", post(routes::retrigger))
        .route("/api/test-debate", post(routes::test_debate))
        .route("/api/test-hansard", post(routes::test_hansard))
        .layer(axum_mw::from_fn_with_state(Arc::clone(&state), middleware::require_api_key));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(%addr, "starting admin API");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
