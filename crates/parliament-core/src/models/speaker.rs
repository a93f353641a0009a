//! Speaker model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A debate-scoped attributed identity.
///
/// Speakers are not shared across debates: the same human gets one row per
/// debate they appear in, keyed on `(debate_id, normalised_name)`. Cross-debate
/// identity resolution is out of scope (spec §1, non-goal).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Speaker {
    pub id: Uuid,
    pub debate_id: Uuid,
    pub display_name: String,
    /// Accent-stripped, lower-cased, honorific-stripped form. Uniqueness key.
    pub normalised_name: String,
    pub party: Option<String>,
    pub riding: Option<String>,
    pub external_id: Option<String>,
    /// Free-text hint: presiding officer, minister, member.
    pub role_hint: Option<String>,
    #[sqlx(json)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Speaker {
    #[must_use]
    pub fn new(debate_id: Uuid, display_name: String, normalised_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            debate_id,
            display_name,
            normalised_name,
            party: None,
            riding: None,
            external_id: None,
            role_hint: None,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party = Some(party.into());
        self
    }

    #[must_use]
    pub fn with_riding(mut self, riding: impl Into<String>) -> Self {
        self.riding = Some(riding.into());
        self
    }

    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    #[must_use]
    pub fn with_role_hint(mut self, role_hint: impl Into<String>) -> Self {
        self.role_hint = Some(role_hint.into());
        self
    }
}
