use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

use super::SqliteRepositories;
use super::types::UserRow;
use super::util::map_sqlx_error;

#[async_trait]
impl UsersRepo for SqliteRepositories {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, password_hash, joined_at) VALUES (?, ?, ?) \
             RETURNING id, username, password_hash, joined_at",
        )
        .bind(username)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, joined_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, joined_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(UserRecord::from))
    }

    async fn delete_user(&self, id: i64) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
