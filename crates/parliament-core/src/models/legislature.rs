use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Government level of a legislature, used by the publisher to tag forum posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
pub enum GovernmentLevel {
    Federal,
    Provincial,
}

impl std::fmt::Display for GovernmentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Federal => "federal",
            Self::Provincial => "provincial",
        };
        write!(f, "{s}")
    }
}

/// A jurisdiction the pipeline polls, e.g. `CA`, `ON`, `QC`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Legislature {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub level: GovernmentLevel,
    /// Ordered preferred languages, 1-2 entries (e.g. `["en", "fr"]`).
    pub languages: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Legislature {
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, level: GovernmentLevel) -> Self {
        let languages = match level {
            GovernmentLevel::Federal => vec!["en".to_string(), "fr".to_string()],
            GovernmentLevel::Provincial => vec!["en".to_string()],
        };
        Self {
            id: Uuid::now_v7(),
            code: code.into(),
            name: name.into(),
            level,
            languages,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_federal(&self) -> bool {
        matches!(self.level, GovernmentLevel::Federal)
    }

    #[must_use]
    pub fn is_bilingual(&self) -> bool {
        self.languages.len() > 1
    }
}
