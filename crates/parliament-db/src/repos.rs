//! Repository implementations

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

pub use category_assignment::CategoryRepo;
pub use contribution::ContributionRepo;
pub use debate::DebateRepo;
pub use forum_post::ForumPostRepo;
pub use legislature::LegislatureRepo;
pub use media_asset::MediaAssetRepo;
pub use speaker::SpeakerRepo;
pub use summary::SummaryRepo;
pub use topic_section::TopicSectionRepo;
pub use transcript::TranscriptRepo;
pub use vote::VoteRepo;
