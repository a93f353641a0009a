//! Summary model — per-language lay-audience rendering of a debate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::En => "en",
            Self::Fr => "fr",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "en" => Self::En,
            "fr" => Self::Fr,
            other => return Err(CoreError::InvalidStatus(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyParticipant {
    pub name: String,
    pub party: Option<String>,
    pub riding: Option<String>,
    pub stance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyIssue {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Summary {
    pub id: Uuid,
    pub debate_id: Uuid,
    /// Wire string, one of [`Language`]'s variants.
    pub language: String,
    pub summary_text: String,
    #[sqlx(json)]
    pub key_participants: Vec<KeyParticipant>,
    #[sqlx(json)]
    pub key_issues: Vec<KeyIssue>,
    pub outcome_sentence: Option<String>,
    pub model_id: String,
    pub created_at: DateTime<Utc>,
}

impl Summary {
    #[must_use]
    pub fn new(debate_id: Uuid, language: Language, summary_text: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            debate_id,
            language: language.to_string(),
            summary_text: summary_text.into(),
            key_participants: Vec::new(),
            key_issues: Vec::new(),
            outcome_sentence: None,
            model_id: model_id.into(),
            created_at: Utc::now(),
        }
    }

    /// # Panics
    /// Panics if the stored `language` column is not one of [`Language`]'s
    /// wire variants.
    #[must_use]
    #[expect(clippy::missing_panics_doc)]
    pub fn language(&self) -> Language {
        self.language.parse().expect("language column holds a valid Language")
    }
}
