//! Record store adapter (spec §4.1): transactional access to debates,
//! contributions, speakers, topics, votes, summaries, categories and forum
//! posts, behind typed repositories keyed on opaque identifiers.

mod error;
mod repos;

pub use error::DbError;
pub use repos::*;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Database connection wrapper
#[derive(Clone)]
pub struct Database(PgPool);

impl Database {
    /// Connect to the database with the given URL
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the connection fails
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self(pool))
    }

    /// Get the underlying connection pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.0
    }

    #[must_use]
    pub const fn legislatures(&self) -> LegislatureRepo<'_> {
        LegislatureRepo::new(&self.0)
    }

    #[must_use]
    pub const fn debates(&self) -> DebateRepo<'_> {
        DebateRepo::new(&self.0)
    }

    #[must_use]
    pub const fn speakers(&self) -> SpeakerRepo<'_> {
        SpeakerRepo::new(&self.0)
    }

    #[must_use]
    pub const fn contributions(&self) -> ContributionRepo<'_> {
        ContributionRepo::new(&self.0)
    }

    #[must_use]
    pub const fn topic_sections(&self) -> TopicSectionRepo<'_> {
        TopicSectionRepo::new(&self.0)
    }

    #[must_use]
    pub const fn votes(&self) -> VoteRepo<'_> {
        VoteRepo::new(&self.0)
    }

    #[must_use]
    pub const fn summaries(&self) -> SummaryRepo<'_> {
        SummaryRepo::new(&self.0)
    }

    #[must_use]
    pub const fn categories(&self) -> CategoryRepo<'_> {
        CategoryRepo::new(&self.0)
    }

    #[must_use]
    pub const fn media_assets(&self) -> MediaAssetRepo<'_> {
        MediaAssetRepo::new(&self.0)
    }

    #[must_use]
    pub const fn transcripts(&self) -> TranscriptRepo<'_> {
        TranscriptRepo::new(&self.0)
    }

    #[must_use]
    pub const fn forum_posts(&self) -> ForumPostRepo<'_> {
        ForumPostRepo::new(&self.0)
    }
}
