//! Forum post model — the published rendering of a debate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Pending,
    Created,
    Failed,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Created => "created",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PostStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => Self::Pending,
            "created" => Self::Created,
            "failed" => Self::Failed,
            other => return Err(CoreError::InvalidStatus(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ForumPost {
    pub id: Uuid,
    pub debate_id: Uuid,
    /// Identifier the forum application returned on creation.
    pub issue_id: Option<String>,
    /// Wire string, one of [`PostStatus`]'s variants.
    pub status: String,
    pub rendered_html: String,
    pub created_at: DateTime<Utc>,
}

impl ForumPost {
    #[must_use]
    pub fn new(debate_id: Uuid, rendered_html: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            debate_id,
            issue_id: None,
            status: PostStatus::Pending.to_string(),
            rendered_html: rendered_html.into(),
            created_at: Utc::now(),
        }
    }

    /// # Panics
    /// Panics if the stored `status` column is not one of [`PostStatus`]'s
    /// wire variants.
    #[must_use]
    #[expect(clippy::missing_panics_doc)]
    pub fn status(&self) -> PostStatus {
        self.status.parse().expect("status column holds a valid PostStatus")
    }
}
