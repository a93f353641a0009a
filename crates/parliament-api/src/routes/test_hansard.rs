//! `POST /api/test-hansard` — create a debate for a sitting date and run it
//! through the transcript-first chain (spec §6). Manual-testing hook for
//! the Hansard scraper and downstream stages without waiting on a poller.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{NaiveDate, Utc};
use parliament_core::{Debate, DebateStatus};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{TestHansardRequest, TestRunResponse};
use crate::state::AppState;

const TEST_LEGISLATURE_CODE: &str = "CA";

#[utoipa::path(
    post,
    path = "/api/test-hansard",
    request_body = TestHansardRequest,
    responses((status = 200, description = "Debate created and queued transcript-first", body = TestRunResponse))
)]
pub async fn test_hansard(State(state): State<Arc<AppState>>, Json(request): Json<TestHansardRequest>) -> Result<Json<TestRunResponse>, ApiError> {
    let sitting_date = NaiveDate::parse_from_str(&request.sitting_date, "%Y-%m-%d")
        .map_err(|err| ApiError::BadRequest(format!("invalid sitting_date: {err}")))?;

    let legislature = state.db.legislatures().get_by_code(TEST_LEGISLATURE_CODE).await?;
    let now = Utc::now();
    let debate_id = Uuid::now_v7();

    let debate = Debate {
        id: debate_id,
        legislature_id: legislature.id,
        external_id: format!("test-{debate_id}"),
        title: request.title.unwrap_or_else(|| "Manual test debate".to_string()),
        title_fr: None,
        sitting_date,
        session_kind: parliament_core::SessionKind::House.to_string(),
        committee_name: None,
        status: DebateStatus::Detected.to_string(),
        retry_count: 0,
        video_url: None,
        hansard_url: None,
        source_urls: vec![],
        error_message: None,
        metadata: serde_json::json!({}),
        created_at: now,
        updated_at: now,
    };

    state.db.debates().create(&debate).await?;

    let pipeline = state.pipeline.clone();
    let runner = Arc::clone(&state.runner);
    tokio::spawn(async move {
        if let Err(err) = runner.run_chain(&pipeline, debate_id, true).await {
            tracing::error!(%debate_id, error = %err, "manual hansard-first test run failed");
        }
    });

    Ok(Json(TestRunResponse { status: "queued".to_string(), debate_id }))
}
