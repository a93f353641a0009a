//! `POST /api/retrigger` — resume a stalled or failed debate (spec §6, §9).
//!
//! Writes `from_stage` back onto the debate and clears its error message
//! without touching `retry_count` (spec §9: an operator retrigger is not a
//! stage retry), then dispatches the remainder of the requested chain in
//! the background — the request itself only confirms the debate was
//! re-queued.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use parliament_core::DebateStatus;

use crate::error::ApiError;
use crate::models::{RetriggerRequest, RetriggerResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/retrigger",
    request_body = RetriggerRequest,
    responses((status = 200, description = "Debate re-queued from the given stage", body = RetriggerResponse))
)]
pub async fn retrigger(State(state): State<Arc<AppState>>, Json(request): Json<RetriggerRequest>) -> Result<Json<RetriggerResponse>, ApiError> {
    let from_stage: DebateStatus = request.from_stage.parse()?;
    let hansard_first = request.variant != "audio";

    state.db.debates().retrigger(request.debate_id, from_stage).await?;

    let pipeline = state.pipeline.clone();
    let runner = Arc::clone(&state.runner);
    let debate_id = request.debate_id;
    tokio::spawn(async move {
        if let Err(err) = runner.run_chain(&pipeline, debate_id, hansard_first).await {
            tracing::error!(%debate_id, error = %err, "retriggered pipeline run failed");
        }
    });

    Ok(Json(RetriggerResponse { status: "queued", debate_id: request.debate_id, from_stage: from_stage.to_string() }))
}
