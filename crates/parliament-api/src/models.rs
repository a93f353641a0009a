//! Request/response DTOs for the admin HTTP surface (spec §6).

use parliament_core::Debate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub broker_connected: bool,
    pub store_connected: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PollRequest {
    pub legislature_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub total: i64,
    pub by_status: std::collections::BTreeMap<String, i64>,
    pub recent_errors: Vec<DebateInfo>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDebatesQuery {
    pub status: Option<String>,
    pub legislature_code: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebateInfo {
    pub id: Uuid,
    pub legislature_code: String,
    pub external_id: String,
    pub title: String,
    pub sitting_date: String,
    pub status: String,
    pub retry_count: i32,
    pub error_message: Option<String>,
}

impl DebateInfo {
    #[must_use]
    pub fn from_debate(debate: &Debate, legislature_code: &str) -> Self {
        Self {
            id: debate.id,
            legislature_code: legislature_code.to_string(),
            external_id: debate.external_id.clone(),
            title: debate.title.clone(),
            sitting_date: debate.sitting_date.to_string(),
            status: debate.status.clone(),
            retry_count: debate.retry_count,
            error_message: debate.error_message.clone(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RetriggerRequest {
    pub debate_id: Uuid,
    pub from_stage: String,
    /// `"hansard"` or `"audio"`; selects which of the two chains to resume.
    pub variant: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RetriggerResponse {
    pub status: &'static str,
    pub debate_id: Uuid,
    pub from_stage: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TestDebateRequest {
    pub video_url: String,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TestHansardRequest {
    pub sitting_date: String,
    pub title: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestRunResponse {
    pub status: String,
    pub debate_id: Uuid,
}
