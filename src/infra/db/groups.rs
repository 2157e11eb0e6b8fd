use async_trait::async_trait;

use crate::application::repos::{GroupsRepo, RepoError};
use crate::domain::entities::GroupRecord;

use super::SqliteRepositories;
use super::types::GroupRow;
use super::util::map_sqlx_error;

#[async_trait]
impl GroupsRepo for SqliteRepositories {
    async fn create_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<GroupRecord, RepoError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "INSERT INTO groups (title, slug, description) VALUES (?, ?, ?) \
             RETURNING id, title, slug, description",
        )
        .bind(title)
        .bind(slug)
        .bind(description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM groups WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(GroupRecord::from))
    }

    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT id, title, slug, description FROM groups ORDER BY title ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(GroupRecord::from).collect())
    }

    async fn delete_group(&self, id: i64) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
