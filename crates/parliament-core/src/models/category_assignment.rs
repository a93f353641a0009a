//! Category assignment model — topic-slug classification of a debate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::CoreError;

/// Closed, wire-stable topic taxonomy (spec §6). Fifteen slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicSlug {
    General,
    Healthcare,
    Economy,
    Housing,
    Climate,
    Education,
    Transit,
    Immigration,
    Indigenous,
    Defense,
    Justice,
    Childcare,
    Accessibility,
    Budget,
    Other,
}

impl TopicSlug {
    /// All fifteen slugs, in wire-declaration order.
    pub const ALL: [Self; 15] = [
        Self::General,
        Self::Healthcare,
        Self::Economy,
        Self::Housing,
        Self::Climate,
        Self::Education,
        Self::Transit,
        Self::Immigration,
        Self::Indigenous,
        Self::Defense,
        Self::Justice,
        Self::Childcare,
        Self::Accessibility,
        Self::Budget,
        Self::Other,
    ];
}

impl fmt::Display for TopicSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::General => "general",
            Self::Healthcare => "healthcare",
            Self::Economy => "economy",
            Self::Housing => "housing",
            Self::Climate => "climate",
            Self::Education => "education",
            Self::Transit => "transit",
            Self::Immigration => "immigration",
            Self::Indigenous => "indigenous",
            Self::Defense => "defense",
            Self::Justice => "justice",
            Self::Childcare => "childcare",
            Self::Accessibility => "accessibility",
            Self::Budget => "budget",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TopicSlug {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "general" => Self::General,
            "healthcare" => Self::Healthcare,
            "economy" => Self::Economy,
            "housing" => Self::Housing,
            "climate" => Self::Climate,
            "education" => Self::Education,
            "transit" => Self::Transit,
            "immigration" => Self::Immigration,
            "indigenous" => Self::Indigenous,
            "defense" => Self::Defense,
            "justice" => Self::Justice,
            "childcare" => Self::Childcare,
            "accessibility" => Self::Accessibility,
            "budget" => Self::Budget,
            "other" => Self::Other,
            other => return Err(CoreError::InvalidTopicSlug(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryAssignment {
    pub id: Uuid,
    pub debate_id: Uuid,
    /// Wire string, one of [`TopicSlug`]'s variants.
    pub topic_slug: String,
    pub confidence: f64,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl CategoryAssignment {
    #[must_use]
    pub fn new(debate_id: Uuid, topic_slug: TopicSlug, confidence: f64, is_primary: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            debate_id,
            topic_slug: topic_slug.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            is_primary,
            created_at: Utc::now(),
        }
    }

    /// # Panics
    /// Panics if the stored `topic_slug` column is not one of [`TopicSlug`]'s
    /// wire variants.
    #[must_use]
    #[expect(clippy::missing_panics_doc)]
    pub fn topic_slug(&self) -> TopicSlug {
        self.topic_slug.parse().expect("topic_slug column holds a valid TopicSlug")
    }
}
