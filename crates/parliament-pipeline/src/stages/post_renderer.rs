//! Forum post rendering (spec §4.8 / C8, rendering half).
//!
//! Grounded in `post_renderer.py`: turns a debate's summary, key
//! participants/issues, votes and a handful of representative quotes into
//! one HTML document via an `askama` template. Pure and synchronous — no
//! network or database access happens here, that is [`super::forum_publisher`]'s job.

use askama::Template;
use parliament_core::{Contribution, Debate, KeyIssue, KeyParticipant, Legislature, Speaker, Vote};
use parliament_util::{format_date_long, format_duration, truncate_with_ellipsis};
use uuid::Uuid;

const MAX_KEY_QUOTES: usize = 6;
const MIN_QUOTE_CHARS: usize = 50;
const QUOTE_MAX_CHARS: usize = 280;

struct QuoteView {
    speaker_name: String,
    text: String,
}

#[derive(Template)]
#[template(path = "forum_post.html")]
struct PostTemplate<'a> {
    title: &'a str,
    legislature_name: &'a str,
    sitting_date: String,
    duration: String,
    summary_text: &'a str,
    outcome_sentence: Option<&'a str>,
    key_participants: &'a [KeyParticipant],
    key_issues: &'a [KeyIssue],
    key_quotes: Vec<QuoteView>,
    votes: &'a [Vote],
    categories: String,
}

/// Title shown on the forum post: the debate's title plus its sitting date.
#[must_use]
pub fn build_post_title(debate: &Debate) -> String {
    format!("{} — {}", debate.title, format_date_long(debate.sitting_date))
}

/// Renders a debate's summary and supporting records into one HTML post.
#[must_use]
#[expect(clippy::too_many_arguments)]
pub fn render_post(
    debate: &Debate,
    legislature: &Legislature,
    summary_text: &str,
    outcome_sentence: Option<&str>,
    key_participants: &[KeyParticipant],
    key_issues: &[KeyIssue],
    contributions: &[Contribution],
    speakers: &[Speaker],
    votes: &[Vote],
    categories: &[String],
    duration_seconds: i64,
) -> String {
    let template = PostTemplate {
        title: &build_post_title(debate),
        legislature_name: &legislature.name,
        sitting_date: format_date_long(debate.sitting_date),
        duration: format_duration(duration_seconds),
        summary_text,
        outcome_sentence,
        key_participants,
        key_issues,
        key_quotes: select_key_quotes(contributions, speakers),
        votes,
        categories: categories.join(", "),
    };

    template.render().unwrap_or_else(|err| {
        tracing::error!(%debate.id, error = %err, "post template render failed, falling back to plain summary");
        format!("<article><h1>{}</h1><p>{summary_text}</p></article>", build_post_title(debate))
    })
}

/// Picks up to [`MAX_KEY_QUOTES`] representative quotes (spec §4.8): filter
/// to contributions of at least [`MIN_QUOTE_CHARS`], sort longest-first,
/// greedily take one per distinct party until the cap is reached, then
/// backfill with the longest remaining contributions from speakers not
/// already represented. Final order follows original speaking order.
fn select_key_quotes(contributions: &[Contribution], speakers: &[Speaker]) -> Vec<QuoteView> {
    let speaker_of = |contribution: &Contribution| contribution.speaker_id.and_then(|id| speakers.iter().find(|s| s.id == id));

    let mut candidates: Vec<&Contribution> = contributions.iter().filter(|c| c.text.trim().chars().count() >= MIN_QUOTE_CHARS).collect();
    candidates.sort_by(|a, b| b.text.len().cmp(&a.text.len()));

    let mut selected: Vec<&Contribution> = Vec::new();
    let mut seen_parties: Vec<&str> = Vec::new();
    let mut seen_speakers: Vec<Uuid> = Vec::new();

    for contribution in &candidates {
        if selected.len() >= MAX_KEY_QUOTES {
            break;
        }
        let party = speaker_of(contribution).and_then(|s| s.party.as_deref());
        let already_represented = party.is_some_and(|p| seen_parties.contains(&p));
        if already_represented {
            continue;
        }
        if let Some(p) = party {
            seen_parties.push(p);
        }
        if let Some(id) = contribution.speaker_id {
            seen_speakers.push(id);
        }
        selected.push(contribution);
    }

    for contribution in &candidates {
        if selected.len() >= MAX_KEY_QUOTES {
            break;
        }
        let speaker_id = contribution.speaker_id;
        let already_selected = speaker_id.is_some_and(|id| seen_speakers.contains(&id)) || selected.iter().any(|c| std::ptr::eq(*c, *contribution));
        if already_selected {
            continue;
        }
        if let Some(id) = speaker_id {
            seen_speakers.push(id);
        }
        selected.push(contribution);
    }

    selected.sort_by_key(|c| c.sequence_order);

    selected
        .into_iter()
        .map(|contribution| {
            let speaker_name = speaker_of(contribution).map_or("Unknown", |s| s.display_name.as_str());
            QuoteView { speaker_name: speaker_name.to_string(), text: truncate_with_ellipsis(contribution.text.trim(), QUOTE_MAX_CHARS) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn contribution_with_speaker(debate_id: Uuid, text: &str, sequence_order: i32, speaker_id: Option<Uuid>) -> Contribution {
        let mut contribution = Contribution::new(debate_id, text.to_string(), sequence_order);
        if let Some(id) = speaker_id {
            contribution = contribution.with_speaker(id);
        }
        contribution
    }

    fn sample_debate() -> Debate {
        Debate {
            id: Uuid::now_v7(),
            legislature_id: Uuid::now_v7(),
            external_id: "ext-1".to_string(),
            title: "Debate on Bill C-56".to_string(),
            title_fr: None,
            sitting_date: NaiveDate::from_ymd_opt(2026, 7, 29).expect("valid date"),
            session_kind: "house".to_string(),
            committee_name: None,
            status: "publishing".to_string(),
            retry_count: 0,
            video_url: None,
            hansard_url: None,
            source_urls: Vec::new(),
            error_message: None,
            metadata: serde_json::json!({}),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn title_includes_formatted_date() {
        let debate = sample_debate();
        assert_eq!(build_post_title(&debate), "Debate on Bill C-56 — July 29, 2026");
    }

    #[test]
    fn selects_top_quotes_in_speaking_order() {
        let debate_id = Uuid::now_v7();
        let speaker_id = Uuid::now_v7();
        let speaker = Speaker::new(debate_id, "Jane Smith".to_string(), "jane smith".to_string());
        let mut speaker = speaker;
        speaker.id = speaker_id;

        let short = contribution_with_speaker(debate_id, "short remark here", 0, Some(speaker_id));
        let long = contribution_with_speaker(
            debate_id,
            "this is a much longer remark with considerably more words in it than the other one",
            1,
            Some(speaker_id),
        );
        let unattributed = contribution_with_speaker(debate_id, "unattributed words with no speaker resolved at all", 2, None);

        let quotes = select_key_quotes(&[short, long, unattributed], &[speaker]);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].speaker_name, "Jane Smith");
    }
}
