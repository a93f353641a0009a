//! Topic section model — a grouping of contributions under one agenda item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A grouping of contributions under one agenda item or bill within a debate.
///
/// Uniqueness: `(debate_id, title)` (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TopicSection {
    pub id: Uuid,
    pub debate_id: Uuid,
    pub title: String,
    pub external_topic_id: Option<String>,
    /// Order-of-business bucket label, e.g. "Government Orders".
    pub section_label: String,
    pub speech_count: i32,
    pub speaker_count: i32,
    /// Sorted, de-duplicated party abbreviations involved in this section.
    pub parties: Vec<String>,
    pub sequence_order: i32,
    pub created_at: DateTime<Utc>,
}

impl TopicSection {
    #[must_use]
    pub fn new(debate_id: Uuid, title: impl Into<String>, section_label: impl Into<String>, sequence_order: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            debate_id,
            title: title.into(),
            external_topic_id: None,
            section_label: section_label.into(),
            speech_count: 0,
            speaker_count: 0,
            parties: Vec::new(),
            sequence_order,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_external_topic_id(mut self, id: impl Into<String>) -> Self {
        self.external_topic_id = Some(id.into());
        self
    }
}

/// Fixed priority ordering for order-of-business section labels (spec, grounded
/// in the transcript scraper's grouping rule). Lower index sorts first;
/// unrecognised labels fall back to a generic bucket sorted after all named
/// ones but before nothing (they use [`section_priority`]'s default).
const SECTION_PRIORITY: &[&str] = &[
    "Government Orders",
    "Oral Question Period",
    "Routine Proceedings",
    "Private Members' Business",
    "Statements by Members",
    "Adjournment Proceedings",
];

/// Priority rank for a section label; unknown labels sort last (rank = list
/// length, i.e. the "General" bucket).
#[must_use]
pub fn section_priority(label: &str) -> usize {
    SECTION_PRIORITY
        .iter()
        .position(|candidate| *candidate == label)
        .unwrap_or(SECTION_PRIORITY.len())
}
