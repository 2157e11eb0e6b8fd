use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{CommentListItem, CommentsRepo, RepoError};
use crate::domain::entities::CommentRecord;

use super::SqliteRepositories;
use super::types::CommentRow;
use super::util::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct InsertedComment {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created: OffsetDateTime,
}

#[async_trait]
impl CommentsRepo for SqliteRepositories {
    async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<CommentRecord, RepoError> {
        let row = sqlx::query_as::<_, InsertedComment>(
            "INSERT INTO comments (post_id, author_id, text, created) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, post_id, author_id, text, created",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(CommentRecord {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            text: row.text,
            created: row.created,
        })
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentListItem>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.post_id, c.author_id, c.text, c.created, \
                    u.username AS author_username \
             FROM comments c \
             INNER JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = ? \
             ORDER BY c.created ASC, c.id ASC",
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(CommentListItem::from).collect())
    }

    async fn count_for_post(&self, post_id: i64) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }
}
