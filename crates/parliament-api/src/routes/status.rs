//! `GET /api/status` — aggregate debate counts by stage plus the last 10
//! errors (spec §6).

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::models::{DebateInfo, StatusResponse};
use crate::state::AppState;

const RECENT_ERROR_LIMIT: i64 = 10;

#[utoipa::path(get, path = "/api/status", responses((status = 200, description = "Aggregate pipeline status", body = StatusResponse)))]
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let by_status_rows = state.db.debates().count_by_status().await?;
    let total = by_status_rows.iter().map(|(_, count)| count).sum();
    let by_status: BTreeMap<String, i64> = by_status_rows.into_iter().collect();

    let errors = state.db.debates().recent_errors(RECENT_ERROR_LIMIT).await?;
    let mut recent_errors = Vec::with_capacity(errors.len());
    for debate in &errors {
        let legislature = state.db.legislatures().get_by_id(debate.legislature_id).await?;
        let code = legislature.map_or_else(|| "unknown".to_string(), |l| l.code);
        recent_errors.push(DebateInfo::from_debate(debate, &code));
    }

    Ok(Json(StatusResponse { total, by_status, recent_errors }))
}
