//! `GET /api/debates` — paginated debate listing (spec §6).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use parliament_core::DebateStatus;

use crate::error::ApiError;
use crate::models::{DebateInfo, ListDebatesQuery};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/debates",
    params(ListDebatesQuery),
    responses((status = 200, description = "Paginated debate list", body = [DebateInfo]))
)]
pub async fn list_debates(State(state): State<Arc<AppState>>, Query(query): Query<ListDebatesQuery>) -> Result<Json<Vec<DebateInfo>>, ApiError> {
    let status: Option<DebateStatus> = query.status.as_deref().map(str::parse).transpose()?;

    let legislature_id = match &query.legislature_code {
        Some(code) => Some(state.db.legislatures().get_by_code(code).await?.id),
        None => None,
    };

    let debates = state.db.debates().list(status, legislature_id, query.limit).await?;

    let mut infos = Vec::with_capacity(debates.len());
    for debate in &debates {
        let code = match &query.legislature_code {
            Some(code) => code.clone(),
            None => state.db.legislatures().get_by_id(debate.legislature_id).await?.map_or_else(|| "unknown".to_string(), |l| l.code),
        };
        infos.push(DebateInfo::from_debate(debate, &code));
    }

    Ok(Json(infos))
}
