//! `POST /api/poll` — trigger a poll run (spec §6).

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use parliament_pipeline::stages::{poll_all_sources, poll_single_source};

use crate::error::ApiError;
use crate::models::PollRequest;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/poll",
    request_body = PollRequest,
    responses((status = 200, description = "Poll results per legislature"))
)]
pub async fn trigger_poll(State(state): State<Arc<AppState>>, Json(request): Json<PollRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    let results = match request.legislature_code {
        Some(code) => {
            let result = poll_single_source(&state.pipeline, &state.runner, &code).await.map_err(|err| ApiError::Internal(err.to_string()))?;
            vec![result]
        }
        None => poll_all_sources(&state.pipeline, &state.runner).await,
    };

    Ok(Json(serde_json::json!(results)))
}
