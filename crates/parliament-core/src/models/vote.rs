//! Vote model — a recorded division attached to a debate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteResult {
    Passed,
    Defeated,
}

impl fmt::Display for VoteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Passed => "passed",
            Self::Defeated => "defeated",
        };
        write!(f, "{s}")
    }
}

impl FromStr for VoteResult {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "passed" => Self::Passed,
            "defeated" => Self::Defeated,
            other => return Err(CoreError::InvalidVoteResult(other.to_string())),
        })
    }
}

/// Per-member detail in a division, when the source publishes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberVote {
    pub member_name: String,
    pub party: Option<String>,
    /// `yea`, `nay`, `paired`, or `abstain`.
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vote {
    pub id: Uuid,
    pub debate_id: Uuid,
    pub motion_text: String,
    pub motion_text_secondary: Option<String>,
    pub bill_number: Option<String>,
    pub yea_count: i32,
    pub nay_count: i32,
    pub paired_count: i32,
    pub abstain_count: i32,
    /// Wire string, one of [`VoteResult`]'s variants.
    pub result: String,
    pub source_id: String,
    #[sqlx(json)]
    pub member_votes: Option<Vec<MemberVote>>,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    #[must_use]
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        debate_id: Uuid,
        motion_text: impl Into<String>,
        source_id: impl Into<String>,
        yea_count: i32,
        nay_count: i32,
        paired_count: i32,
        abstain_count: i32,
        result: VoteResult,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            debate_id,
            motion_text: motion_text.into(),
            motion_text_secondary: None,
            bill_number: None,
            yea_count,
            nay_count,
            paired_count,
            abstain_count,
            result: result.to_string(),
            source_id: source_id.into(),
            member_votes: None,
            created_at: Utc::now(),
        }
    }

    /// # Panics
    /// Panics if the stored `result` column is not one of [`VoteResult`]'s
    /// wire variants.
    #[must_use]
    #[expect(clippy::missing_panics_doc)]
    pub fn result(&self) -> VoteResult {
        self.result.parse().expect("result column holds a valid VoteResult")
    }
}
