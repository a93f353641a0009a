mod category_assignment;
mod contribution;
mod debate;
mod forum_post;
mod legislature;
mod media_asset;
mod speaker;
mod summary;
mod topic_section;
mod transcript;
mod vote;

pub use category_assignment::{CategoryAssignment, TopicSlug};
pub use contribution::Contribution;
pub use debate::{Debate, DebateStatus, SessionKind, SourceUrl, SourceUrlKind};
pub use forum_post::{ForumPost, PostStatus};
pub use legislature::{GovernmentLevel, Legislature};
pub use media_asset::{MediaAsset, MediaAssetStatus};
pub use speaker::Speaker;
pub use summary::{KeyIssue, KeyParticipant, Language, Summary};
pub use topic_section::{TopicSection, section_priority};
pub use transcript::{Transcript, TranscriptSegment, WordTimestamp};
pub use vote::{MemberVote, Vote, VoteResult};
