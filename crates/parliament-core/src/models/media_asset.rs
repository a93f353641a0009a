//! Media asset model — an acquired audio source for the audio-first chain.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaAssetStatus {
    Ready,
    Failed,
}

impl fmt::Display for MediaAssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MediaAssetStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ready" => Self::Ready,
            "failed" => Self::Failed,
            other => return Err(CoreError::InvalidStatus(other.to_string())),
        })
    }
}

/// An acquired audio source (spec: "present only on the audio-first chain").
/// Grounded in `downloader.py`'s `download_media` return shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaAsset {
    pub id: Uuid,
    pub debate_id: Uuid,
    /// Currently always `"audio"`; kept as a string for forward compatibility.
    pub kind: String,
    /// One of `direct`, `hls`, `youtube` — how the asset was acquired.
    pub source_label: String,
    pub original_url: String,
    pub local_path: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub duration_seconds: Option<f64>,
    /// Inferred from legislature code: `en`, `fr`, or `en+fr`.
    pub language_hint: String,
    /// Wire string, one of [`MediaAssetStatus`]'s variants.
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MediaAsset {
    #[must_use]
    pub fn new(debate_id: Uuid, source_label: impl Into<String>, original_url: impl Into<String>, language_hint: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            debate_id,
            kind: "audio".to_string(),
            source_label: source_label.into(),
            original_url: original_url.into(),
            local_path: None,
            file_size_bytes: None,
            duration_seconds: None,
            language_hint: language_hint.into(),
            status: MediaAssetStatus::Ready.to_string(),
            error_message: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn failed(debate_id: Uuid, source_label: impl Into<String>, original_url: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            debate_id,
            kind: "audio".to_string(),
            source_label: source_label.into(),
            original_url: original_url.into(),
            local_path: None,
            file_size_bytes: None,
            duration_seconds: None,
            language_hint: String::new(),
            status: MediaAssetStatus::Failed.to_string(),
            error_message: Some(error_message.into()),
            created_at: Utc::now(),
        }
    }

    /// # Panics
    /// Panics if the stored `status` column is not one of
    /// [`MediaAssetStatus`]'s wire variants.
    #[must_use]
    #[expect(clippy::missing_panics_doc)]
    pub fn status(&self) -> MediaAssetStatus {
        self.status.parse().expect("status column holds a valid MediaAssetStatus")
    }
}
