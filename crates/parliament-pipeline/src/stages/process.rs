//! Speaker attribution, contribution building, and vote extraction
//! (spec §4.5-§4.6 / C5-C6).
//!
//! Hansard-first debates arrive here with contributions already attributed
//! by [`super::hansard_scraper`] — this stage only extracts votes for them.
//! Audio-first debates arrive with transcript segments and no attribution;
//! this stage builds contributions by aligning each segment against an
//! optional Hansard cross-reference (word-overlap, grounded in
//! `speaker_mapper.py`), honouring an explicit `Name:` prefix override the
//! same way `contribution_extractor.py` does, then coalesces consecutive
//! same-speaker segments into one contribution, dropping anything under
//! three words.

use std::collections::HashMap;

use async_trait::async_trait;
use parliament_core::{Contribution, Debate, Legislature, Speaker, TranscriptSegment};
use parliament_util::{SPEAKER_PREFIX_RE, jaccard_similarity, normalize_speaker_name};
use scraper::{Html, Selector};
use uuid::Uuid;

use crate::error::StageError;
use crate::orchestrator::{PipelineContext, Stage};
use crate::stages::vote_extractor;

const ALIGNMENT_THRESHOLD: f64 = 0.30;
const ALIGNMENT_WINDOW_CHARS: usize = 200;
const MIN_CONTRIBUTION_WORDS: usize = 3;

struct Intervention {
    speaker_name: String,
    text: String,
}

pub struct ProcessStage;

#[async_trait]
impl Stage for ProcessStage {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn run(&self, ctx: &PipelineContext, debate_id: Uuid) -> Result<(), StageError> {
        let debate = ctx.db.debates().get_by_id(debate_id).await?;
        let legislature = ctx
            .db
            .legislatures()
            .get_by_id(debate.legislature_id)
            .await?
            .ok_or_else(|| StageError::Fatal(format!("legislature {} not found", debate.legislature_id)))?;

        let already_attributed = ctx.db.contributions().count_for_debate(debate_id).await? > 0;
        if already_attributed {
            tracing::info!(%debate_id, "contributions already attributed by Hansard scrape, skipping alignment");
        } else {
            build_contributions_from_transcript(ctx, &debate, &legislature).await?;
        }

        let votes = vote_extractor::extract_votes(ctx, &debate, &legislature).await;
        let vote_count = votes.len();
        ctx.db.votes().replace_for_debate(debate_id, &votes).await?;

        tracing::info!(%debate_id, vote_count, already_attributed, "processing complete");
        Ok(())
    }
}

async fn build_contributions_from_transcript(ctx: &PipelineContext, debate: &Debate, legislature: &Legislature) -> Result<(), StageError> {
    let Some(primary_language) = legislature.languages.first() else {
        return Err(StageError::Contract(format!("legislature {} has no configured language", legislature.code)));
    };

    let Some(transcript) = ctx.db.transcripts().get_by_language(debate.id, primary_language).await? else {
        return Err(StageError::DataMissing(format!("no {primary_language} transcript for debate {}", debate.id)));
    };

    let interventions = fetch_hansard_interventions(ctx, debate).await;
    let aligned = align_segments(&transcript.segments, &interventions);

    let mut speaker_ids: HashMap<String, Uuid> = HashMap::new();
    let mut contributions = Vec::new();
    let mut sequence_order = 0i32;
    let mut group: Option<(Option<String>, String, f64, f64)> = None;

    for (speaker_name, segment) in aligned {
        let same_speaker = matches!(&group, Some((current, ..)) if *current == speaker_name);
        if same_speaker {
            if let Some((_, text, _, end)) = &mut group {
                text.push(' ');
                text.push_str(segment.text.trim());
                *end = segment.end;
            }
            continue;
        }

        if let Some((name, text, start, end)) = group.take() {
            if let Some(contribution) = finalize_contribution(ctx, debate.id, name, text, start, end, &mut speaker_ids, sequence_order).await? {
                sequence_order += 1;
                contributions.push(contribution);
            }
        }
        group = Some((speaker_name, segment.text.trim().to_string(), segment.start, segment.end));
    }
    if let Some((name, text, start, end)) = group.take() {
        if let Some(contribution) = finalize_contribution(ctx, debate.id, name, text, start, end, &mut speaker_ids, sequence_order).await? {
            contributions.push(contribution);
        }
    }

    if legislature.is_bilingual() {
        if let Some(secondary_language) = legislature.languages.get(1) {
            if let Some(secondary) = ctx.db.transcripts().get_by_language(debate.id, secondary_language).await? {
                attach_secondary_text(&mut contributions, &secondary.segments);
            }
        }
    }

    ctx.db.contributions().replace_for_debate(debate.id, &contributions).await?;
    tracing::info!(%debate.id, contributions = contributions.len(), interventions = interventions.len(), "contributions built from transcript");
    Ok(())
}

/// Walks segments in order, preferring an explicit `Name:` prefix, falling
/// back to advancing a cursor through the Hansard cross-reference whenever
/// the next intervention's opening words overlap the segment's (spec §4.5(b)).
fn align_segments<'a>(segments: &'a [TranscriptSegment], interventions: &[Intervention]) -> Vec<(Option<String>, &'a TranscriptSegment)> {
    let known_speakers = known_speaker_map(interventions);
    let mut aligned = Vec::with_capacity(segments.len());
    let mut cursor = 0usize;
    let mut current_speaker: Option<String> = None;

    for segment in segments {
        if let Some(captures) = SPEAKER_PREFIX_RE.captures(&segment.text) {
            let captured_name = captures[1].trim().to_string();
            current_speaker = Some(resolve_known_speaker(&captured_name, &known_speakers));
        } else if cursor < interventions.len() {
            let window: String = segment.text.chars().take(ALIGNMENT_WINDOW_CHARS).collect();
            let candidate: String = interventions[cursor].text.chars().take(ALIGNMENT_WINDOW_CHARS).collect();
            if jaccard_similarity(&window, &candidate) > ALIGNMENT_THRESHOLD {
                current_speaker = Some(interventions[cursor].speaker_name.clone());
                cursor += 1;
            }
        }
        aligned.push((current_speaker.clone(), segment));
    }
    aligned
}

/// Distinct `(normalised name, canonical name)` pairs drawn from the Hansard
/// cross-reference, first-seen order — the "known speaker map" [`align_segments`]
/// resolves a regex-captured name against (spec §4.5(b)(iii), grounded on
/// `speaker_mapper.py`'s `speaker_name_to_id`).
fn known_speaker_map(interventions: &[Intervention]) -> Vec<(String, String)> {
    let mut map = Vec::new();
    for intervention in interventions {
        let normalised = normalize_speaker_name(&intervention.speaker_name);
        if !map.iter().any(|(n, _): &(String, String)| *n == normalised) {
            map.push((normalised, intervention.speaker_name.clone()));
        }
    }
    map
}

/// Resolves a `Name:` prefix capture against the known speaker map: exact
/// match on the normalised name first, then substring match either way
/// (`"J. Smith"` against `"John Smith"`), returning the map's canonical
/// spelling so two captures of the same speaker collapse to one identity.
/// Falls back to the captured name verbatim when nothing matches, the same
/// as when there is no Hansard cross-reference to match against at all.
fn resolve_known_speaker(captured_name: &str, known_speakers: &[(String, String)]) -> String {
    let normalised_capture = normalize_speaker_name(captured_name);

    if let Some((_, canonical)) = known_speakers.iter().find(|(normalised, _)| *normalised == normalised_capture) {
        return canonical.clone();
    }

    if let Some((_, canonical)) = known_speakers
        .iter()
        .find(|(normalised, _)| normalised_capture.contains(normalised.as_str()) || normalised.contains(normalised_capture.as_str()))
    {
        return canonical.clone();
    }

    captured_name.to_string()
}

#[expect(clippy::too_many_arguments)]
async fn finalize_contribution(
    ctx: &PipelineContext,
    debate_id: Uuid,
    speaker_name: Option<String>,
    text: String,
    start: f64,
    end: f64,
    speaker_ids: &mut HashMap<String, Uuid>,
    sequence_order: i32,
) -> Result<Option<Contribution>, StageError> {
    let trimmed = text.trim();
    if trimmed.split_whitespace().count() < MIN_CONTRIBUTION_WORDS {
        return Ok(None);
    }

    let mut contribution = Contribution::new(debate_id, trimmed.to_string(), sequence_order).with_time_range(start, end);

    if let Some(name) = speaker_name {
        let normalised = normalize_speaker_name(&name);
        let speaker_id = if let Some(&id) = speaker_ids.get(&normalised) {
            id
        } else {
            let speaker = Speaker::new(debate_id, name.clone(), normalised.clone());
            let saved = ctx.db.speakers().upsert(&speaker).await?;
            speaker_ids.insert(normalised, saved.id);
            saved.id
        };
        contribution = contribution.with_raw_speaker_label(name).with_speaker(speaker_id);
    }

    Ok(Some(contribution))
}

/// Attaches the other official language's transcript as `text_secondary`
/// wherever its segments' time range overlaps a contribution's.
fn attach_secondary_text(contributions: &mut [Contribution], secondary_segments: &[TranscriptSegment]) {
    for contribution in contributions.iter_mut() {
        let (Some(start), Some(end)) = (contribution.start_seconds, contribution.end_seconds) else {
            continue;
        };

        let overlapping: Vec<&str> = secondary_segments
            .iter()
            .filter(|segment| segment.start < end && segment.end > start)
            .map(|segment| segment.text.trim())
            .collect();

        if !overlapping.is_empty() {
            contribution.text_secondary = Some(overlapping.join(" "));
        }
    }
}

/// Best-effort cross-reference fetch: a plain `Name: remarks` listing pulled
/// from the debate's Hansard page, used only to assist alignment. A missing
/// `hansard_url`, a failed fetch, or no matches all soft-fail to an empty
/// list — the `Name:` prefix override in [`align_segments`] still works
/// without it.
async fn fetch_hansard_interventions(ctx: &PipelineContext, debate: &Debate) -> Vec<Intervention> {
    let Some(hansard_url) = &debate.hansard_url else {
        return Vec::new();
    };

    let html = match ctx.http.get(hansard_url).send().await {
        Ok(response) => match response.text().await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(%debate.id, error = %err, "Hansard cross-reference read failed");
                return Vec::new();
            }
        },
        Err(err) => {
            tracing::warn!(%debate.id, error = %err, "Hansard cross-reference fetch failed");
            return Vec::new();
        }
    };

    let document = Html::parse_document(&html);
    let Ok(selector) = Selector::parse("p, .speech-text, .content-text, [class*='speech'], [class*='content']") else {
        return Vec::new();
    };

    let mut interventions = Vec::new();
    for element in document.select(&selector) {
        let text = element.text().collect::<String>();
        let Some(captures) = SPEAKER_PREFIX_RE.captures(text.trim()) else {
            continue;
        };
        let speaker_name = captures[1].trim().to_string();
        let remarks = text[captures[0].len()..].trim().to_string();
        if !remarks.is_empty() {
            interventions.push(Intervention { speaker_name, text: remarks });
        }
    }
    interventions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment { start, end, text: text.to_string(), confidence: 0.9, no_speech_prob: 0.01, words: None }
    }

    #[test]
    fn aligns_via_name_prefix_override() {
        let segments = vec![segment("Smith: thank you Mister Speaker.", 0.0, 2.0)];
        let aligned = align_segments(&segments, &[]);
        assert_eq!(aligned[0].0.as_deref(), Some("Smith"));
    }

    #[test]
    fn aligns_via_hansard_overlap_when_no_prefix() {
        let segments = vec![segment("the house will now proceed to the consideration of orders of the day", 0.0, 4.0)];
        let interventions = vec![Intervention {
            speaker_name: "The Speaker".to_string(),
            text: "the house will now proceed to the consideration of orders of the day".to_string(),
        }];
        let aligned = align_segments(&segments, &interventions);
        assert_eq!(aligned[0].0.as_deref(), Some("The Speaker"));
    }

    #[test]
    fn prefix_override_resolves_against_known_speaker() {
        let segments = vec![segment("Smith: thank you Mister Speaker.", 0.0, 2.0)];
        let interventions = vec![Intervention { speaker_name: "John Smith".to_string(), text: "unrelated remarks entirely".to_string() }];
        let aligned = align_segments(&segments, &interventions);
        assert_eq!(aligned[0].0.as_deref(), Some("John Smith"));
    }

    #[test]
    fn carries_speaker_across_unmatched_segments() {
        let segments = vec![
            segment("Smith: let me begin my remarks today.", 0.0, 2.0),
            segment("and continue on the same topic further.", 2.0, 4.0),
        ];
        let aligned = align_segments(&segments, &[]);
        assert_eq!(aligned[1].0.as_deref(), Some("Smith"));
    }
}
