//! `GET /health` — liveness and dependency probe (spec §6). Unauthenticated.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use sqlx::Row;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Broker connectivity is best-effort: the pipeline treats the task queue
/// as an external collaborator (spec §1) and holds no persistent client for
/// it, so this only checks that a URL was configured.
fn broker_reachable(broker_url: &str) -> bool {
    !broker_url.is_empty()
}

#[utoipa::path(get, path = "/health", responses((status = 200, description = "Liveness probe", body = HealthResponse)))]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store_connected = sqlx::query("SELECT 1").fetch_one(state.db.pool()).await.is_ok_and(|row| row.try_get::<i32, _>(0).is_ok());

    Json(HealthResponse { status: "ok", broker_connected: broker_reachable(&state.config.broker_url), store_connected })
}
