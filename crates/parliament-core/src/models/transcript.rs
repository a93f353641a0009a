//! Transcript model — a recogniser run's output, audio-first chain only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One recognised segment, mirrors `whisper_service.py`'s per-segment dict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub confidence: f64,
    pub no_speech_prob: f64,
    pub words: Option<Vec<WordTimestamp>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordTimestamp {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// The raw text + timed segments produced by the speech recogniser for one
/// media asset. Present only on the audio-first chain; transcript-first
/// debates never populate this table (the Hansard scrape writes straight to
/// Contribution/TopicSection).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transcript {
    pub id: Uuid,
    pub debate_id: Uuid,
    pub media_asset_id: Uuid,
    pub language: String,
    pub raw_text: String,
    #[sqlx(json)]
    pub segments: Vec<TranscriptSegment>,
    pub model_id: String,
    pub avg_confidence: f64,
    pub word_count: i32,
    pub processing_time_seconds: f64,
    pub detected_language: Option<String>,
    pub language_probability: Option<f64>,
    pub audio_duration_seconds: f64,
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    #[must_use]
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        debate_id: Uuid,
        media_asset_id: Uuid,
        language: impl Into<String>,
        raw_text: impl Into<String>,
        segments: Vec<TranscriptSegment>,
        model_id: impl Into<String>,
        audio_duration_seconds: f64,
    ) -> Self {
        let word_count = i32::try_from(raw_text_word_count(&segments)).unwrap_or(i32::MAX);
        let avg_confidence = average_confidence(&segments);
        Self {
            id: Uuid::now_v7(),
            debate_id,
            media_asset_id,
            language: language.into(),
            raw_text: raw_text.into(),
            segments,
            model_id: model_id.into(),
            avg_confidence,
            word_count,
            processing_time_seconds: 0.0,
            detected_language: None,
            language_probability: None,
            audio_duration_seconds,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_processing_time(mut self, seconds: f64) -> Self {
        self.processing_time_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_detected_language(mut self, language: impl Into<String>, probability: f64) -> Self {
        self.detected_language = Some(language.into());
        self.language_probability = Some(probability);
        self
    }
}

fn raw_text_word_count(segments: &[TranscriptSegment]) -> usize {
    segments.iter().map(|s| s.text.split_whitespace().count()).sum()
}

fn average_confidence(segments: &[TranscriptSegment]) -> f64 {
    if segments.is_empty() {
        return 0.0;
    }
    segments.iter().map(|s| s.confidence).sum::<f64>() / segments.len() as f64
}
