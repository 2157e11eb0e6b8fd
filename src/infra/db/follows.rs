use async_trait::async_trait;

use crate::application::repos::{FollowsRepo, RepoError};

use super::SqliteRepositories;
use super::util::map_sqlx_error;

#[async_trait]
impl FollowsRepo for SqliteRepositories {
    async fn follow(&self, user_id: i64, author_id: i64) -> Result<(), RepoError> {
        // The UNIQUE pair plus OR IGNORE makes a repeated follow a no-op.
        sqlx::query("INSERT OR IGNORE INTO follows (user_id, author_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(exists)
    }
}
