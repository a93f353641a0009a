use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::CoreError;

/// Wire-stable pipeline stage status (spec §6). Stored as `VARCHAR`, not as a
/// Postgres enum, so new variants can ship without a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStatus {
    Scheduled,
    Detected,
    ScrapingHansard,
    Ingesting,
    Transcribing,
    Processing,
    Summarizing,
    Categorizing,
    Publishing,
    Published,
    Error,
}

impl DebateStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Published | Self::Error)
    }
}

impl fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Scheduled => "scheduled",
            Self::Detected => "detected",
            Self::ScrapingHansard => "scraping_hansard",
            Self::Ingesting => "ingesting",
            Self::Transcribing => "transcribing",
            Self::Processing => "processing",
            Self::Summarizing => "summarizing",
            Self::Categorizing => "categorizing",
            Self::Publishing => "publishing",
            Self::Published => "published",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DebateStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "scheduled" => Self::Scheduled,
            "detected" => Self::Detected,
            "scraping_hansard" => Self::ScrapingHansard,
            "ingesting" => Self::Ingesting,
            "transcribing" => Self::Transcribing,
            "processing" => Self::Processing,
            "summarizing" => Self::Summarizing,
            "categorizing" => Self::Categorizing,
            "publishing" => Self::Publishing,
            "published" => Self::Published,
            "error" => Self::Error,
            other => return Err(CoreError::InvalidStatus(other.to_string())),
        })
    }
}

/// Agenda-unit kind for a debate or committee meeting (spec §6, closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    House,
    Committee,
    QuestionPeriod,
    Emergency,
    Other,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::House => "house",
            Self::Committee => "committee",
            Self::QuestionPeriod => "question_period",
            Self::Emergency => "emergency",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SessionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "house" => Self::House,
            "committee" => Self::Committee,
            "question_period" => Self::QuestionPeriod,
            "emergency" => Self::Emergency,
            "other" => Self::Other,
            other => return Err(CoreError::InvalidSessionKind(other.to_string())),
        })
    }
}

/// Tag for one entry in a debate's `source_urls` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceUrlKind {
    Video,
    Hansard,
    Calendar,
    Notice,
}

impl fmt::Display for SourceUrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Video => "video",
            Self::Hansard => "hansard",
            Self::Calendar => "calendar",
            Self::Notice => "notice",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SourceUrlKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "video" => Self::Video,
            "hansard" => Self::Hansard,
            "calendar" => Self::Calendar,
            "notice" => Self::Notice,
            other => return Err(CoreError::InvalidSourceUrlKind(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrl {
    pub kind: SourceUrlKind,
    pub url: String,
    pub label: Option<String>,
}

/// The pipeline's unit of work: one sitting (or committee meeting).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Debate {
    pub id: Uuid,
    pub legislature_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub title_fr: Option<String>,
    pub sitting_date: NaiveDate,
    /// Wire string, one of [`SessionKind`]'s variants. Kept as a raw column
    /// (mirrors `status` below) so an unrecognised value from an older row
    /// doesn't fail the whole query — callers decide via [`Debate::session_kind`].
    pub session_kind: String,
    pub committee_name: Option<String>,
    /// Wire string, one of [`DebateStatus`]'s variants.
    pub status: String,
    pub retry_count: i32,
    pub video_url: Option<String>,
    pub hansard_url: Option<String>,
    #[sqlx(json)]
    pub source_urls: Vec<SourceUrl>,
    pub error_message: Option<String>,
    #[sqlx(json)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debate {
    /// # Panics
    /// Panics if the stored `status` column is not one of [`DebateStatus`]'s
    /// wire variants. Rows are only ever written through typed setters, so
    /// this should never fire outside of a corrupted column.
    #[must_use]
    #[expect(clippy::missing_panics_doc)]
    pub fn status(&self) -> DebateStatus {
        self.status.parse().expect("status column holds a valid DebateStatus")
    }

    /// # Panics
    /// Panics if the stored `session_kind` column is not one of
    /// [`SessionKind`]'s wire variants.
    #[must_use]
    #[expect(clippy::missing_panics_doc)]
    pub fn session_kind(&self) -> SessionKind {
        self.session_kind
            .parse()
            .expect("session_kind column holds a valid SessionKind")
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    #[must_use]
    pub fn is_recent(&self, within_days: i64) -> bool {
        let today = Utc::now().date_naive();
        (today - self.sitting_date).num_days() <= within_days
    }
}
