//! Contribution model — one continuous speech turn within a debate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One continuous speech turn attributed to one speaker, or left unattributed
/// when no speaker could be resolved.
///
/// `sequence_order` is dense and 0-based within a debate; the set of values
/// across a debate's contributions must form `{0, 1, ..., N-1}` (spec §3, §8).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contribution {
    pub id: Uuid,
    pub debate_id: Uuid,
    pub speaker_id: Option<Uuid>,
    /// Raw label as it appeared in the source, kept even when `speaker_id`
    /// resolves, so re-alignment can be audited.
    pub raw_speaker_label: Option<String>,
    pub text: String,
    pub text_secondary: Option<String>,
    pub start_seconds: Option<f64>,
    pub end_seconds: Option<f64>,
    pub sequence_order: i32,
    #[sqlx(json)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Contribution {
    #[must_use]
    pub fn new(debate_id: Uuid, text: String, sequence_order: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            debate_id,
            speaker_id: None,
            raw_speaker_label: None,
            text,
            text_secondary: None,
            start_seconds: None,
            end_seconds: None,
            sequence_order,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_speaker(mut self, speaker_id: Uuid) -> Self {
        self.speaker_id = Some(speaker_id);
        self
    }

    #[must_use]
    pub fn with_raw_speaker_label(mut self, label: impl Into<String>) -> Self {
        self.raw_speaker_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_secondary_text(mut self, text: impl Into<String>) -> Self {
        self.text_secondary = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_time_range(mut self, start: f64, end: f64) -> Self {
        self.start_seconds = Some(start);
        self.end_seconds = Some(end);
        self
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
