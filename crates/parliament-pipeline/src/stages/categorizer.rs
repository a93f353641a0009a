//! Categoriser (spec §4.7 / C7, category half).
//!
//! Grounded in `categorizer.py`: a cheap keyword signal and an LLM signal
//! are blended (`keyword * 0.3 + llm * 0.7`), anything under `0.1` is
//! dropped, the survivors are capped at three, and the highest becomes the
//! primary. If even the top blended score stays under `0.1` the debate is
//! filed under the catch-all `general` topic instead (confidence `0.5`), so
//! every debate gets at least one assignment.

use std::collections::HashMap;
use std::sync::{LazyLock, OnceLock};

use async_trait::async_trait;
use parliament_core::{CategoryAssignment, Summary, TopicSlug};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::StageError;
use crate::orchestrator::{PipelineContext, Stage};

const KEYWORD_WEIGHT: f64 = 0.3;
const LLM_WEIGHT: f64 = 0.7;
const ASSIGNMENT_THRESHOLD: f64 = 0.1;
const MAX_ASSIGNMENTS: usize = 3;
const GENERAL_FALLBACK_CONFIDENCE: f64 = 0.5;
/// Leading slice of each transcript folded into the keyword source text (spec §4.7).
const MAX_TRANSCRIPT_EXCERPT_CHARS: usize = 20_000;
/// At most this many contributions contribute to the keyword source text.
const MAX_CATEGORY_CONTRIBUTIONS: usize = 100;
/// Each of those contributions is truncated to this many characters.
const MAX_CONTRIBUTION_EXCERPT_CHARS: usize = 500;

static KEYWORD_MAP: LazyLock<HashMap<TopicSlug, &'static [&'static str]>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert(TopicSlug::Healthcare, ["health", "hospital", "medicare", "nurse", "patient", "healthcare", "sante"].as_slice());
    map.insert(TopicSlug::Economy, ["economy", "inflation", "gdp", "trade", "tariff", "employment", "economie"].as_slice());
    map.insert(TopicSlug::Housing, ["housing", "rent", "mortgage", "homeless", "tenant", "logement"].as_slice());
    map.insert(TopicSlug::Climate, ["climate", "emissions", "carbon", "pipeline", "renewable", "environnement"].as_slice());
    map.insert(TopicSlug::Education, ["school", "student", "tuition", "teacher", "curriculum", "education"].as_slice());
    map.insert(TopicSlug::Transit, ["transit", "highway", "infrastructure", "railway", "transport"].as_slice());
    map.insert(TopicSlug::Immigration, ["immigration", "refugee", "asylum", "visa", "immigrant", "immigration"].as_slice());
    map.insert(TopicSlug::Indigenous, ["indigenous", "first nations", "inuit", "metis", "reconciliation", "autochtone"].as_slice());
    map.insert(TopicSlug::Defense, ["defence", "defense", "military", "armed forces", "nato", "veteran"].as_slice());
    map.insert(TopicSlug::Justice, ["justice", "criminal", "court", "sentencing", "police", "tribunal"].as_slice());
    map.insert(TopicSlug::Childcare, ["childcare", "daycare", "child care", "garderie"].as_slice());
    map.insert(TopicSlug::Accessibility, ["accessibility", "disability", "accessible", "handicap"].as_slice());
    map.insert(TopicSlug::Budget, ["budget", "deficit", "fiscal", "taxation", "spending estimates"].as_slice());
    map
});

/// Per-topic score from raw keyword occurrence counts: `min(1, ln(1+count)/5)`
/// (spec §4.7), counting every occurrence of every keyword in the list, not
/// just distinct hits.
fn keyword_scores(text: &str) -> HashMap<TopicSlug, f64> {
    let lower = text.to_lowercase();
    KEYWORD_MAP
        .iter()
        .map(|(&slug, keywords)| {
            let count: usize = keywords.iter().map(|kw| lower.matches(kw).count()).sum();
            #[expect(clippy::cast_precision_loss)]
            let score = (1.0 + count as f64).ln() / 5.0;
            (slug, score.min(1.0))
        })
        .collect()
}

#[async_trait]
pub trait CategoryModel: Send + Sync {
    async fn categorize(&self, debate_title: &str, transcript: &str) -> Result<HashMap<TopicSlug, f64>, StageError>;
}

#[derive(Debug, Deserialize)]
struct CategoryCompletion {
    #[serde(default)]
    scores: HashMap<String, f64>,
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

pub struct HttpCategoryModel {
    api_key: String,
    model: String,
}

impl HttpCategoryModel {
    fn from_config(config: &Config) -> Self {
        Self { api_key: config.llm_api_key.clone(), model: config.llm_category_model.clone() }
    }
}

#[async_trait]
impl CategoryModel for HttpCategoryModel {
    async fn categorize(&self, debate_title: &str, transcript: &str) -> Result<HashMap<TopicSlug, f64>, StageError> {
        let topic_list = TopicSlug::ALL.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        let system_prompt = format!(
            "You classify Canadian parliamentary debates into topics. Valid topics: {topic_list}. \
             Reply with a single JSON object {{\"scores\": {{\"topic_slug\": 0.0-1.0, ...}}}} covering \
             only the topics you believe apply, omitting general and other. No prose outside the JSON."
        );
        let user_prompt = format!("Debate: {debate_title}\n\nTranscript excerpt:\n{transcript}");

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0.0,
        });

        let client = reqwest::Client::new();
        let response = client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StageError::Transient(format!("category model returned HTTP {}", response.status())));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion.choices.into_iter().next().map(|c| c.message.content).unwrap_or_default();

        match serde_json::from_str::<CategoryCompletion>(&content) {
            Ok(parsed) => Ok(parsed
                .scores
                .into_iter()
                .filter_map(|(slug, score)| slug.parse::<TopicSlug>().ok().map(|slug| (slug, score.clamp(0.0, 1.0))))
                .collect()),
            Err(err) => {
                tracing::warn!(%err, "category completion was not well-formed JSON, scoring nothing");
                Ok(HashMap::new())
            }
        }
    }
}

static CATEGORY_MODEL: OnceLock<HttpCategoryModel> = OnceLock::new();

fn category_model(config: &Config) -> &'static HttpCategoryModel {
    CATEGORY_MODEL.get_or_init(|| HttpCategoryModel::from_config(config))
}

pub struct CategorizeStage;

#[async_trait]
impl Stage for CategorizeStage {
    fn name(&self) -> &'static str {
        "categorize"
    }

    async fn run(&self, ctx: &PipelineContext, debate_id: Uuid) -> Result<(), StageError> {
        let debate = ctx.db.debates().get_by_id(debate_id).await?;
        let summaries = ctx.db.summaries().list_for_debate(debate_id).await?;
        if summaries.is_empty() {
            return Err(StageError::DataMissing(format!("no summary to categorise for debate {debate_id}")));
        }

        let transcripts = ctx.db.transcripts().list_for_debate(debate_id).await?;
        let contributions = ctx.db.contributions().list_for_debate(debate_id).await?;
        let source_text = build_category_source_text(&summaries, &transcripts, &contributions);

        let keyword = keyword_scores(&source_text);

        let model = category_model(&ctx.config);
        let llm = model.categorize(&debate.title, &source_text).await.unwrap_or_else(|err| {
            tracing::warn!(%debate_id, error = %err, "category model call failed, using keyword signal alone");
            HashMap::new()
        });

        let assignments = merge_scores(debate_id, &keyword, &llm);
        ctx.db.categories().replace_for_debate(debate_id, &assignments).await?;

        tracing::info!(%debate_id, assignments = assignments.len(), "categorisation complete");
        Ok(())
    }
}

/// Source text for both the keyword and LLM signals: every language's
/// summary, the leading 20 KB of each transcript, and the first 500 chars of
/// up to 100 contributions (spec §4.7).
fn build_category_source_text(summaries: &[Summary], transcripts: &[parliament_core::Transcript], contributions: &[parliament_core::Contribution]) -> String {
    let mut text = String::new();

    for summary in summaries {
        text.push_str(&summary.summary_text);
        text.push('\n');
    }

    for transcript in transcripts {
        let excerpt: String = transcript.raw_text.chars().take(MAX_TRANSCRIPT_EXCERPT_CHARS).collect();
        text.push_str(&excerpt);
        text.push('\n');
    }

    for contribution in contributions.iter().take(MAX_CATEGORY_CONTRIBUTIONS) {
        let excerpt: String = contribution.text.chars().take(MAX_CONTRIBUTION_EXCERPT_CHARS).collect();
        text.push_str(&excerpt);
        text.push('\n');
    }

    text
}

fn merge_scores(debate_id: Uuid, keyword: &HashMap<TopicSlug, f64>, llm: &HashMap<TopicSlug, f64>) -> Vec<CategoryAssignment> {
    let mut merged: Vec<(TopicSlug, f64)> = TopicSlug::ALL
        .iter()
        .filter(|slug| !matches!(slug, TopicSlug::General | TopicSlug::Other))
        .map(|&slug| {
            let score = keyword.get(&slug).copied().unwrap_or(0.0) * KEYWORD_WEIGHT + llm.get(&slug).copied().unwrap_or(0.0) * LLM_WEIGHT;
            (slug, score)
        })
        .collect();
    merged.sort_by(|a, b| b.1.total_cmp(&a.1));

    let top_score = merged.first().map_or(0.0, |(_, score)| *score);
    if top_score < ASSIGNMENT_THRESHOLD {
        return vec![CategoryAssignment::new(debate_id, TopicSlug::General, GENERAL_FALLBACK_CONFIDENCE, true)];
    }

    merged
        .into_iter()
        .filter(|(_, score)| *score >= ASSIGNMENT_THRESHOLD)
        .take(MAX_ASSIGNMENTS)
        .enumerate()
        .map(|(index, (slug, score))| CategoryAssignment::new(debate_id, slug, score, index == 0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_scores_detect_obvious_topics() {
        let scores = keyword_scores("The hospital needs more nurses and patient care funding.");
        assert!(scores[&TopicSlug::Healthcare] > 0.0);
        assert_eq!(scores.get(&TopicSlug::Defense).copied().unwrap_or(0.0), 0.0);
    }

    #[test]
    fn falls_back_to_general_when_scores_are_low() {
        let assignments = merge_scores(Uuid::now_v7(), &HashMap::new(), &HashMap::new());
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].topic_slug(), TopicSlug::General);
        assert!(assignments[0].is_primary);
    }

    #[test]
    fn caps_assignments_at_three_with_first_primary() {
        let mut llm = HashMap::new();
        llm.insert(TopicSlug::Healthcare, 0.9);
        llm.insert(TopicSlug::Economy, 0.8);
        llm.insert(TopicSlug::Housing, 0.7);
        llm.insert(TopicSlug::Climate, 0.6);

        let assignments = merge_scores(Uuid::now_v7(), &HashMap::new(), &llm);
        assert_eq!(assignments.len(), MAX_ASSIGNMENTS);
        assert!(assignments[0].is_primary);
        assert!(!assignments[1].is_primary);
    }

    #[test]
    fn source_text_caps_transcripts_and_contributions() {
        use parliament_core::{Contribution, Language};

        let debate_id = Uuid::now_v7();
        let summaries = vec![Summary::new(debate_id, Language::En, "a lay summary", "gpt-4o")];

        let long_transcript = "z".repeat(MAX_TRANSCRIPT_EXCERPT_CHARS + 500);
        let transcripts =
            vec![parliament_core::Transcript::new(debate_id, Uuid::now_v7(), "en", long_transcript.clone(), Vec::new(), "whisper-1", 0.0)];

        let long_contribution = "y".repeat(MAX_CONTRIBUTION_EXCERPT_CHARS + 100);
        let contributions: Vec<Contribution> = (0..150).map(|i| Contribution::new(debate_id, long_contribution.clone(), i)).collect();

        let text = build_category_source_text(&summaries, &transcripts, &contributions);

        assert!(text.contains("a lay summary"));
        assert!(!text.contains(&"z".repeat(MAX_TRANSCRIPT_EXCERPT_CHARS + 1)));
        assert!(!text.contains(&"y".repeat(MAX_CONTRIBUTION_EXCERPT_CHARS + 1)));
        assert_eq!(text.matches('y').count(), MAX_CATEGORY_CONTRIBUTIONS * MAX_CONTRIBUTION_EXCERPT_CHARS);
    }
}
