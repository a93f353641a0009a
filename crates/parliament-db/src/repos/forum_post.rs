//! Forum post repository

use parliament_core::ForumPost;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

pub struct ForumPostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ForumPostRepo<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert keyed on `debate_id` — a debate has exactly one forum post
    /// (spec §8: "exactly one forum-post row exists" once published).
    ///
    /// # Errors
    /// Returns `DbError` if the upsert fails.
    pub async fn upsert(&self, post: &ForumPost) -> Result<ForumPost, DbError> {
        let row = sqlx::query_as::<_, ForumPost>(
            r"
            INSERT INTO forum_posts (id, debate_id, issue_id, status, rendered_html, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (debate_id) DO UPDATE SET
                issue_id = EXCLUDED.issue_id,
                status = EXCLUDED.status,
                rendered_html = EXCLUDED.rendered_html
            RETURNING *
            ",
        )
        .bind(post.id)
        .bind(post.debate_id)
        .bind(&post.issue_id)
        .bind(&post.status)
        .bind(&post.rendered_html)
        .bind(post.created_at)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    /// Returns `DbError` if the query fails.
    pub async fn get_for_debate(&self, debate_id: Uuid) -> Result<Option<ForumPost>, DbError> {
        let row = sqlx::query_as::<_, ForumPost>("SELECT * FROM forum_posts WHERE debate_id = $1")
            .bind(debate_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }
}
