use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, SessionsRepo};
use crate::domain::entities::UserRecord;

use super::SqliteRepositories;
use super::types::UserRow;
use super::util::map_sqlx_error;

#[async_trait]
impl SessionsRepo for SqliteRepositories {
    async fn create_session(&self, user_id: i64) -> Result<String, RepoError> {
        let token = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(OffsetDateTime::now_utc())
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(token)
    }

    async fn find_user_by_session(&self, token: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.username, u.password_hash, u.joined_at \
             FROM sessions s \
             INNER JOIN users u ON u.id = s.user_id \
             WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(UserRecord::from))
    }

    async fn delete_session(&self, token: &str) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
