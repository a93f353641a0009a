//! `POST /api/test-debate` — create a debate from a raw video URL and run
//! it through the audio-first chain (spec §6). Manual-testing hook for the
//! speech-recognition and downstream stages without waiting on a poller.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use parliament_core::{Debate, DebateStatus, SourceUrl, SourceUrlKind};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{TestDebateRequest, TestRunResponse};
use crate::state::AppState;

const TEST_LEGISLATURE_CODE: &str = "CA";

#[utoipa::path(
    post,
    path = "/api/test-debate",
    request_body = TestDebateRequest,
    responses((status = 200, description = "Debate created and queued audio-first", body = TestRunResponse))
)]
pub async fn test_debate(State(state): State<Arc<AppState>>, Json(request): Json<TestDebateRequest>) -> Result<Json<TestRunResponse>, ApiError> {
    let legislature = state.db.legislatures().get_by_code(TEST_LEGISLATURE_CODE).await?;
    let now = Utc::now();
    let debate_id = Uuid::now_v7();

    let debate = Debate {
        id: debate_id,
        legislature_id: legislature.id,
        external_id: format!("test-{debate_id}"),
        title: request.title.unwrap_or_else(|| "Manual test debate".to_string()),
        title_fr: None,
        sitting_date: now.date_naive(),
        session_kind: parliament_core::SessionKind::House.to_string(),
        committee_name: None,
        status: DebateStatus::Detected.to_string(),
        retry_count: 0,
        video_url: Some(request.video_url.clone()),
        hansard_url: None,
        source_urls: vec![SourceUrl { kind: SourceUrlKind::Video, url: request.video_url, label: None }],
        error_message: None,
        metadata: serde_json::json!({}),
        created_at: now,
        updated_at: now,
    };

    state.db.debates().create(&debate).await?;

    let pipeline = state.pipeline.clone();
    let runner = Arc::clone(&state.runner);
    tokio::spawn(async move {
        if let Err(err) = runner.run_chain(&pipeline, debate_id, false).await {
            tracing::error!(%debate_id, error = %err, "manual audio-first test run failed");
        }
    });

    Ok(Json(TestRunResponse { status: "queued".to_string(), debate_id }))
}
