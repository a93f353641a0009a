//! Summariser (spec §4.7 / C7, summary half).
//!
//! Grounded in `summarizer.py`: one lay-audience summary per language the
//! legislature publishes in, produced by an OpenAI-compatible chat
//! completion asked to reply with a JSON object. The model is reached
//! through the narrow [`SummaryModel`] adapter (same stance as C4's
//! [`super::transcribe::SpeechRecognizer`]) so the pipeline never links a
//! particular LLM SDK; [`HttpSummaryModel`] is a process-level singleton
//! built once from [`Config`].

use std::sync::OnceLock;

use async_trait::async_trait;
use parliament_core::{Contribution, KeyIssue, KeyParticipant, Language, Speaker, Summary, Vote};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::StageError;
use crate::orchestrator::{PipelineContext, Stage};

/// Prompt context is capped at this many leading contributions (spec §4.7).
const MAX_PROMPT_CONTRIBUTIONS: usize = 50;
/// Each contribution is truncated to this many characters in the prompt.
const CONTRIBUTION_EXCERPT_CHARS: usize = 300;
const MAX_KEY_PARTICIPANTS: usize = 8;

/// What the summariser is asked to produce for one language.
pub struct SummaryDraft {
    pub summary_text: String,
    pub key_participants: Vec<KeyParticipant>,
    pub key_issues: Vec<KeyIssue>,
    pub outcome_sentence: Option<String>,
}

#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn summarize(&self, debate_title: &str, language: &str, transcript: &str) -> Result<SummaryDraft, StageError>;
}

#[derive(Debug, Deserialize)]
struct SummaryCompletion {
    summary: String,
    #[serde(default)]
    key_participants: Vec<KeyParticipant>,
    #[serde(default)]
    key_issues: Vec<KeyIssue>,
    #[serde(default)]
    outcome_sentence: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

pub struct HttpSummaryModel {
    api_key: String,
    model: String,
}

impl HttpSummaryModel {
    fn from_config(config: &Config) -> Self {
        Self { api_key: config.llm_api_key.clone(), model: config.llm_summary_model.clone() }
    }
}

#[async_trait]
impl SummaryModel for HttpSummaryModel {
    async fn summarize(&self, debate_title: &str, language: &str, transcript: &str) -> Result<SummaryDraft, StageError> {
        let system_prompt = format!(
            "You summarise Canadian parliamentary debates for a general audience in {language}. \
             Reply with a single JSON object with keys summary, key_participants \
             (array of {{name, party, riding, stance}}), key_issues \
             (array of {{label, description}}), and outcome_sentence (string or null). No prose outside the JSON."
        );
        let user_prompt = format!("Debate: {debate_title}\n\nTranscript excerpt:\n{transcript}");

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0.3,
        });

        let client = reqwest::Client::new();
        let response = client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StageError::Transient(format!("summary model returned HTTP {}", response.status())));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion.choices.into_iter().next().map(|c| c.message.content).unwrap_or_default();

        match serde_json::from_str::<SummaryCompletion>(&content) {
            Ok(parsed) => Ok(SummaryDraft {
                summary_text: parsed.summary,
                key_participants: parsed.key_participants,
                key_issues: parsed.key_issues,
                outcome_sentence: parsed.outcome_sentence,
            }),
            Err(err) => {
                tracing::warn!(%err, "summary completion was not well-formed JSON, degrading to raw text");
                Ok(SummaryDraft { summary_text: content.trim().to_string(), key_participants: Vec::new(), key_issues: Vec::new(), outcome_sentence: None })
            }
        }
    }
}

static SUMMARY_MODEL: OnceLock<HttpSummaryModel> = OnceLock::new();

fn summary_model(config: &Config) -> &'static HttpSummaryModel {
    SUMMARY_MODEL.get_or_init(|| HttpSummaryModel::from_config(config))
}

pub struct SummarizeStage;

#[async_trait]
impl Stage for SummarizeStage {
    fn name(&self) -> &'static str {
        "summarize"
    }

    async fn run(&self, ctx: &PipelineContext, debate_id: Uuid) -> Result<(), StageError> {
        let debate = ctx.db.debates().get_by_id(debate_id).await?;
        let legislature = ctx
            .db
            .legislatures()
            .get_by_id(debate.legislature_id)
            .await?
            .ok_or_else(|| StageError::Fatal(format!("legislature {} not found", debate.legislature_id)))?;

        let contributions = ctx.db.contributions().list_for_debate(debate_id).await?;
        if contributions.is_empty() {
            return Err(StageError::DataMissing(format!("no contributions to summarise for debate {debate_id}")));
        }
        let speakers = ctx.db.speakers().list_for_debate(debate_id).await?;
        let votes = ctx.db.votes().list_for_debate(debate_id).await?;

        let model = summary_model(&ctx.config);

        for language in &legislature.languages {
            let prompt_context = build_prompt_context(&contributions, &speakers, &votes, language, &legislature.languages);
            let title = if language.starts_with("fr") { debate.title_fr.as_deref().unwrap_or(&debate.title) } else { &debate.title };
            let parsed_language = language.parse::<Language>().map_err(|err| StageError::Contract(err.to_string()))?;

            let draft = model.summarize(title, language, &prompt_context).await?;

            let mut summary = Summary::new(debate_id, parsed_language, draft.summary_text, &ctx.config.llm_summary_model);
            summary.key_participants = truncate_participants(draft.key_participants);
            summary.key_issues = draft.key_issues;
            summary.outcome_sentence = draft.outcome_sentence;

            ctx.db.summaries().upsert(&summary).await?;
            tracing::info!(%debate_id, language, "summary recorded");
        }

        Ok(())
    }
}

fn truncate_participants(mut participants: Vec<KeyParticipant>) -> Vec<KeyParticipant> {
    participants.truncate(MAX_KEY_PARTICIPANTS);
    participants
}

/// Builds the prompt context exactly as spec'd: up to 50 leading
/// contributions, each truncated to 300 chars, followed by the vote list.
/// Prefers `text_secondary` when the requested language isn't the
/// legislature's primary one and a secondary rendering exists.
fn build_prompt_context(contributions: &[Contribution], speakers: &[Speaker], votes: &[Vote], language: &str, legislature_languages: &[String]) -> String {
    let use_secondary = legislature_languages.first().is_some_and(|primary| primary != language);

    let mut context = String::new();
    for contribution in contributions.iter().take(MAX_PROMPT_CONTRIBUTIONS) {
        let text = if use_secondary { contribution.text_secondary.as_deref().unwrap_or(&contribution.text) } else { contribution.text.as_str() };

        let speaker_name = contribution
            .speaker_id
            .and_then(|id| speakers.iter().find(|s| s.id == id))
            .map_or("Unknown", |s| s.display_name.as_str());

        let excerpt: String = text.chars().take(CONTRIBUTION_EXCERPT_CHARS).collect();
        context.push_str(&format!("{speaker_name}: {excerpt}\n"));
    }

    if !votes.is_empty() {
        context.push_str("\nVotes:\n");
        for vote in votes {
            context.push_str(&format!("- {} — {} ({}-{})\n", vote.motion_text, vote.result, vote.yea_count, vote.nay_count));
        }
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrades_malformed_completion_to_raw_text() {
        let content = "not valid json at all";
        let parsed = serde_json::from_str::<SummaryCompletion>(content);
        assert!(parsed.is_err());
    }

    #[test]
    fn caps_key_participants() {
        let participants: Vec<KeyParticipant> =
            (0..10).map(|i| KeyParticipant { name: format!("Member {i}"), party: None, riding: None, stance: "neutral".to_string() }).collect();
        assert_eq!(truncate_participants(participants).len(), MAX_KEY_PARTICIPANTS);
    }

    #[test]
    fn prompt_context_caps_contributions_and_truncates_text() {
        let debate_id = Uuid::now_v7();
        let long_text = "x".repeat(CONTRIBUTION_EXCERPT_CHARS + 50);
        let contributions: Vec<Contribution> = (0..60).map(|i| Contribution::new(debate_id, long_text.clone(), i)).collect();

        let context = build_prompt_context(&contributions, &[], &[], "en", &["en".to_string()]);
        assert_eq!(context.matches("Unknown:").count(), MAX_PROMPT_CONTRIBUTIONS);
        assert!(!context.contains(&"x".repeat(CONTRIBUTION_EXCERPT_CHARS + 1)));
    }
}
