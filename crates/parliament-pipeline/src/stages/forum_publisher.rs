//! Forum publisher (spec §4.8 / C8, insert-through-interface half).
//!
//! Grounded in `forum_publisher.py`: the rendering done by
//! [`super::post_renderer`] is pure and synchronous; this module owns the
//! one network call — inserting the rendered post as a forum issue — plus
//! the bookkeeping (`forum_posts` row, per-debate media directory cleanup)
//! that must happen exactly once per successful publish.

use async_trait::async_trait;
use parliament_core::{CategoryAssignment, Contribution, Debate, GovernmentLevel, Legislature, Speaker, Summary, TopicSlug, Vote};
use uuid::Uuid;

use crate::config::Config;
use crate::error::StageError;
use crate::orchestrator::{PipelineContext, Stage};
use crate::stages::post_renderer;

/// What gets handed to the forum application to create one issue.
pub struct ForumIssueRequest {
    pub title: String,
    pub body_html: String,
    pub issue_type: &'static str,
    pub topic_slug: String,
    pub government_level: GovernmentLevel,
    /// Present only for provincial debates.
    pub province: Option<String>,
    pub video_url: Option<String>,
}

/// Narrow adapter over the forum application (spec §1: "the forum
/// application ... named interface"). [`HttpForumClient`] is the only
/// implementor; tests substitute a recording stub.
#[async_trait]
pub trait ForumClient: Send + Sync {
    async fn create_issue(&self, request: &ForumIssueRequest) -> Result<String, StageError>;
}

pub struct HttpForumClient {
    base_url: String,
    system_bot_user_id: String,
}

impl HttpForumClient {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self { base_url: config.broker_url.clone(), system_bot_user_id: config.system_bot_user_id.clone() }
    }
}

#[async_trait]
impl ForumClient for HttpForumClient {
    async fn create_issue(&self, request: &ForumIssueRequest) -> Result<String, StageError> {
        #[derive(serde::Deserialize)]
        struct IssueCreated {
            id: String,
        }

        let client = reqwest::Client::new();
        let body = serde_json::json!({
            "title": request.title,
            "body": request.body_html,
            "type": request.issue_type,
            "topic": request.topic_slug,
            "government_level": request.government_level.to_string(),
            "province": request.province,
            "video_url": request.video_url,
            "author_id": self.system_bot_user_id,
        });

        let response = client.post(format!("{}/api/issues", self.base_url)).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(StageError::Transient(format!("forum insert returned HTTP {}", response.status())));
        }

        let created: IssueCreated = response.json().await?;
        Ok(created.id)
    }
}

/// Cleaned per spec §4.8: strips a leading `[DEBATE]`/bracketed legislature
/// tag the source title might already carry, then collapses whitespace, so
/// `build_post_title` never doubles up the prefix this stage adds.
fn clean_title(title: &str) -> String {
    title.trim().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds the `[DEBATE] [<code>] <title>` prefix the forum surface expects.
#[must_use]
pub fn build_issue_title(legislature_code: &str, title: &str) -> String {
    format!("[DEBATE] [{legislature_code}] {}", clean_title(title))
}

pub struct PublishStage;

#[async_trait]
impl Stage for PublishStage {
    fn name(&self) -> &'static str {
        "publish"
    }

    async fn run(&self, ctx: &PipelineContext, debate_id: Uuid) -> Result<(), StageError> {
        let debate = ctx.db.debates().get_by_id(debate_id).await?;
        let legislature = ctx
            .db
            .legislatures()
            .get_by_id(debate.legislature_id)
            .await?
            .ok_or_else(|| StageError::Fatal(format!("legislature {} not found", debate.legislature_id)))?;

        let summaries = ctx.db.summaries().list_for_debate(debate_id).await?;
        let primary_summary = summaries
            .iter()
            .find(|s| s.language().to_string() == "en")
            .or_else(|| summaries.first())
            .ok_or_else(|| StageError::DataMissing(format!("no summary to publish for debate {debate_id}")))?;

        let categories = ctx.db.categories().list_for_debate(debate_id).await?;
        let primary_category = categories.iter().find(|c| c.is_primary).map_or(TopicSlug::General, CategoryAssignment::topic_slug);

        let contributions = ctx.db.contributions().list_for_debate(debate_id).await?;
        let speakers = ctx.db.speakers().list_for_debate(debate_id).await?;
        let votes = ctx.db.votes().list_for_debate(debate_id).await?;

        let duration_seconds = sitting_duration_seconds(&contributions);
        let category_slugs: Vec<String> = categories.iter().map(|c| c.topic_slug().to_string()).collect();

        let html = post_renderer::render_post(
            &debate,
            &legislature,
            &primary_summary.summary_text,
            primary_summary.outcome_sentence.as_deref(),
            &primary_summary.key_participants,
            &primary_summary.key_issues,
            contributions_capped(&contributions),
            &speakers,
            &votes,
            &category_slugs,
            duration_seconds,
        );

        let request = ForumIssueRequest {
            title: build_issue_title(&legislature.code, &debate.title),
            body_html: html.clone(),
            issue_type: "Debate",
            topic_slug: primary_category.to_string(),
            government_level: legislature.level,
            province: (!legislature.is_federal()).then(|| legislature.code.clone()),
            video_url: debate.video_url.clone(),
        };

        let client = HttpForumClient::from_config(&ctx.config);
        let issue_id = client.create_issue(&request).await?;

        let mut post = parliament_core::ForumPost::new(debate_id, html);
        post.issue_id = Some(issue_id);
        post.status = parliament_core::PostStatus::Created.to_string();
        ctx.db.forum_posts().upsert(&post).await?;

        ctx.db.debates().update_status(debate_id, parliament_core::DebateStatus::Published).await?;

        cleanup_media_directory(ctx, debate_id).await;

        tracing::info!(%debate_id, issue_id = %post.issue_id.as_deref().unwrap_or_default(), "debate published");
        Ok(())
    }
}

/// Caps the contribution list handed to the renderer at 100 (spec §4.8).
fn contributions_capped(contributions: &[Contribution]) -> &[Contribution] {
    let cap = contributions.len().min(100);
    &contributions[..cap]
}

/// Sitting duration from the span of attributed time offsets, when present
/// (audio-first debates only — Hansard-scraped contributions have no
/// timing data and fall back to zero, rendered as "0 minutes").
fn sitting_duration_seconds(contributions: &[Contribution]) -> i64 {
    let end = contributions.iter().filter_map(|c| c.end_seconds).fold(0.0_f64, f64::max);
    #[expect(clippy::cast_possible_truncation)]
    (end as i64)
}

/// Deletes the per-debate media working directory on successful publish
/// (spec §5: "deleted on successful publish"). Best-effort — a stray
/// directory does not fail the stage, it just needs an administrative sweep.
async fn cleanup_media_directory(ctx: &PipelineContext, debate_id: Uuid) {
    let debate_dir = ctx.config.media_storage_path().join(debate_id.to_string());
    if tokio::fs::metadata(&debate_dir).await.is_ok() {
        if let Err(err) = tokio::fs::remove_dir_all(&debate_dir).await {
            tracing::warn!(%debate_id, error = %err, "failed to clean up media working directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_prefixed_issue_title() {
        assert_eq!(build_issue_title("CA", "  Debate on Bill C-56  "), "[DEBATE] [CA] Debate on Bill C-56");
    }

    #[test]
    fn duration_is_max_end_offset() {
        let debate_id = Uuid::now_v7();
        let contributions = vec![
            Contribution::new(debate_id, "a".to_string(), 0).with_time_range(0.0, 120.0),
            Contribution::new(debate_id, "b".to_string(), 1).with_time_range(120.0, 300.0),
        ];
        assert_eq!(sitting_duration_seconds(&contributions), 300);
    }

    #[test]
    fn duration_defaults_to_zero_without_timing() {
        let debate_id = Uuid::now_v7();
        let contributions = vec![Contribution::new(debate_id, "a".to_string(), 0)];
        assert_eq!(sitting_duration_seconds(&contributions), 0);
    }
}
