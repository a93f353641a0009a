//! Speech recognition stage (spec §4.4 / C4, audio-first chain only).
//!
//! Grounded in `whisper_service.py`'s `transcribe_audio`: runs the
//! recogniser once per language the legislature expects (federal gets `en`
//! and `fr`; provincial sources get their one language), with voice-activity
//! filtering on by default and a parliamentary-vocabulary priming prompt to
//! bias decoding.
//!
//! The recogniser itself is reached through the narrow [`SpeechRecognizer`]
//! adapter (spec §1: "speech-recognition providers... called through narrow
//! adapters") so the pipeline never links a model-loading crate directly;
//! [`HttpSpeechRecognizer`] is a thin `reqwest` client held as a process-level
//! singleton (spec §9), analogous to a lazily-constructed embedding client.

use std::path::Path;
use std::sync::OnceLock;

use async_trait::async_trait;
use parliament_core::{Transcript, TranscriptSegment, WordTimestamp};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::StageError;
use crate::orchestrator::{PipelineContext, Stage};

const EN_PROMPT: &str = "Parliamentary debate. House of Commons. Legislative Assembly. The Speaker, the Right Honourable Prime Minister, the honourable member. Bill, motion, amendment, recorded division. Oral Question Period. Order, order.";
const FR_PROMPT: &str = "Débat parlementaire. Assemblée nationale. Chambre des communes. Le Président, Monsieur le Premier Ministre, l'honorable député. Projet de loi, motion, amendement, vote par appel nominal. Période des questions orales.";

fn initial_prompt(language: &str) -> &'static str {
    if language.starts_with("fr") { FR_PROMPT } else { EN_PROMPT }
}

#[derive(Debug, Deserialize)]
struct WordPayload {
    word: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct SegmentPayload {
    start: f64,
    end: f64,
    text: String,
    confidence: f64,
    no_speech_prob: f64,
    words: Option<Vec<WordPayload>>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionPayload {
    raw_text: String,
    segments: Vec<SegmentPayload>,
    model: String,
    processing_time_seconds: f64,
    detected_language: Option<String>,
    language_probability: Option<f64>,
    audio_duration: f64,
}

/// What a recogniser adapter returns for one (audio, language) pair.
pub struct TranscriptionResult {
    pub raw_text: String,
    pub segments: Vec<TranscriptSegment>,
    pub model_id: String,
    pub processing_time_seconds: f64,
    pub detected_language: Option<String>,
    pub language_probability: Option<f64>,
    pub audio_duration_seconds: f64,
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn transcribe(&self, audio_path: &Path, language: &str) -> Result<TranscriptionResult, StageError>;
}

/// `faster-whisper`-backed service reached over HTTP, VAD defaults fixed per
/// spec (speech ≥ 250 ms, silence ≥ 500 ms, pad 300 ms).
pub struct HttpSpeechRecognizer {
    base_url: String,
    model: String,
    device: String,
    compute_type: String,
}

impl HttpSpeechRecognizer {
    fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.recognizer_url.clone(),
            model: config.recognizer_model.clone(),
            device: config.recognizer_device.clone(),
            compute_type: config.recognizer_compute_type.clone(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for HttpSpeechRecognizer {
    async fn transcribe(&self, audio_path: &Path, language: &str) -> Result<TranscriptionResult, StageError> {
        let client = reqwest::Client::new();
        let body = serde_json::json!({
            "audio_path": audio_path.display().to_string(),
            "language": language,
            "model": self.model,
            "device": self.device,
            "compute_type": self.compute_type,
            "beam_size": 5,
            "vad_filter": true,
            "vad_parameters": {
                "threshold": 0.5,
                "min_speech_duration_ms": 250,
                "min_silence_duration_ms": 500,
                "speech_pad_ms": 300,
            },
            "word_timestamps": true,
            "condition_on_previous_text": true,
            "initial_prompt": initial_prompt(language),
        });

        let response = client.post(format!("{}/transcribe", self.base_url)).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(StageError::Transient(format!("recogniser returned HTTP {}", response.status())));
        }

        let payload: TranscriptionPayload = response.json().await?;
        let segments = payload
            .segments
            .into_iter()
            .map(|s| TranscriptSegment {
                start: s.start,
                end: s.end,
                text: s.text,
                confidence: s.confidence,
                no_speech_prob: s.no_speech_prob,
                words: s.words.map(|words| words.into_iter().map(|w| WordTimestamp { word: w.word, start: w.start, end: w.end }).collect()),
            })
            .collect();

        Ok(TranscriptionResult {
            raw_text: payload.raw_text,
            segments,
            model_id: payload.model,
            processing_time_seconds: payload.processing_time_seconds,
            detected_language: payload.detected_language,
            language_probability: payload.language_probability,
            audio_duration_seconds: payload.audio_duration,
        })
    }
}

static RECOGNIZER: OnceLock<HttpSpeechRecognizer> = OnceLock::new();

fn recognizer(config: &Config) -> &'static HttpSpeechRecognizer {
    RECOGNIZER.get_or_init(|| HttpSpeechRecognizer::from_config(config))
}

pub struct TranscribeStage;

#[async_trait]
impl Stage for TranscribeStage {
    fn name(&self) -> &'static str {
        "transcribe"
    }

    async fn run(&self, ctx: &PipelineContext, debate_id: Uuid) -> Result<(), StageError> {
        let debate = ctx.db.debates().get_by_id(debate_id).await?;
        let legislature = ctx
            .db
            .legislatures()
            .get_by_id(debate.legislature_id)
            .await?
            .ok_or_else(|| StageError::Fatal(format!("legislature {} not found", debate.legislature_id)))?;

        let media = ctx.db.media_assets().get_ready(debate_id).await?;
        let Some(local_path) = media.local_path.as_ref() else {
            return Err(StageError::Contract(format!("ready media asset {} has no local path", media.id)));
        };
        let audio_path = Path::new(local_path);

        let recognizer = recognizer(&ctx.config);

        for language in &legislature.languages {
            let started = std::time::Instant::now();
            let result = recognizer.transcribe(audio_path, language).await?;
            let elapsed = result.processing_time_seconds.max(started.elapsed().as_secs_f64());

            let mut transcript = Transcript::new(debate_id, media.id, language.clone(), result.raw_text, result.segments, result.model_id, result.audio_duration_seconds)
                .with_processing_time(elapsed);
            if let Some(detected) = result.detected_language {
                transcript = transcript.with_detected_language(detected, result.language_probability.unwrap_or(0.0));
            }

            ctx.db.transcripts().create(&transcript).await?;
            tracing::info!(%debate_id, language, word_count = transcript.word_count, "transcript recorded");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_prompt_by_language_prefix() {
        assert_eq!(initial_prompt("en"), EN_PROMPT);
        assert_eq!(initial_prompt("fr"), FR_PROMPT);
        assert_eq!(initial_prompt("fr-CA"), FR_PROMPT);
    }
}
