use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;

use crate::application::filter::PostFilter;
use crate::application::repos::{
    CreatePostParams, ListWindow, PostListItem, PostListScope, PostsRepo, PostsWriteRepo,
    RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;

use super::SqliteRepositories;
use super::types::{POST_COLUMNS, PostListRow, PostRow};
use super::util::map_sqlx_error;

fn push_list_select(qb: &mut QueryBuilder<'_, sqlx::Sqlite>) {
    qb.push("SELECT ");
    qb.push(POST_COLUMNS);
    qb.push(
        ", u.username AS author_username, g.title AS group_title, g.slug AS group_slug \
         FROM posts p \
         INNER JOIN users u ON u.id = p.author_id \
         LEFT JOIN groups g ON g.id = p.group_id \
         WHERE 1=1 ",
    );
}

#[async_trait]
impl PostsRepo for SqliteRepositories {
    async fn list_posts(
        &self,
        scope: PostListScope,
        filter: &PostFilter,
        window: ListWindow,
    ) -> Result<Vec<PostListItem>, RepoError> {
        let mut qb = QueryBuilder::new("");
        push_list_select(&mut qb);
        Self::apply_scope_conditions(&mut qb, scope);
        Self::apply_filter_conditions(&mut qb, filter);
        qb.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ");
        qb.push_bind(window.limit as i64);
        qb.push(" OFFSET ");
        qb.push_bind(window.offset as i64);

        let rows: Vec<PostListRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(PostListItem::from).collect())
    }

    async fn count_posts(
        &self,
        scope: PostListScope,
        filter: &PostFilter,
    ) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE 1=1 ");
        Self::apply_scope_conditions(&mut qb, scope);
        Self::apply_filter_conditions(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostListItem>, RepoError> {
        let mut qb = QueryBuilder::new("");
        push_list_select(&mut qb);
        qb.push(" AND p.id = ");
        qb.push_bind(id);

        let row: Option<PostListRow> = qb
            .build_query_as()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(PostListItem::from))
    }
}

#[async_trait]
impl PostsWriteRepo for SqliteRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            "INSERT INTO posts (title, text, pub_date, group_id, author_id, address, cost, end_date, image) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING id, title, text, pub_date, group_id, author_id, address, cost, end_date, image",
        )
        .bind(params.title)
        .bind(params.text)
        .bind(OffsetDateTime::now_utc())
        .bind(params.group_id)
        .bind(params.author_id)
        .bind(params.address)
        .bind(params.cost)
        .bind(params.end_date)
        .bind(params.image)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        // pub_date and author_id are deliberately outside the SET list.
        let row = sqlx::query_as::<_, PostRow>(
            "UPDATE posts \
             SET title = ?, text = ?, group_id = ?, address = ?, cost = ?, end_date = ?, image = ? \
             WHERE id = ? \
             RETURNING id, title, text, pub_date, group_id, author_id, address, cost, end_date, image",
        )
        .bind(params.title)
        .bind(params.text)
        .bind(params.group_id)
        .bind(params.address)
        .bind(params.cost)
        .bind(params.end_date)
        .bind(params.image)
        .bind(params.id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.into())
    }
}
