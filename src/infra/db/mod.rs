//! SQLite-backed repository implementations.

mod comments;
mod follows;
mod groups;
mod posts;
mod sessions;
mod types;
mod users;
mod util;

pub use util::map_sqlx_error;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::{
    QueryBuilder, Sqlite, query,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};

use crate::application::filter::PostFilter;
use crate::application::repos::{PostListScope, RepoError};

#[derive(Clone)]
pub struct SqliteRepositories {
    pool: Arc<SqlitePool>,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a pool against the given SQLite URL with foreign keys enforced.
    pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
    }

    pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    fn apply_scope_conditions(qb: &mut QueryBuilder<'_, Sqlite>, scope: PostListScope) {
        match scope {
            PostListScope::All => {}
            PostListScope::Group(group_id) => {
                qb.push(" AND p.group_id = ");
                qb.push_bind(group_id);
            }
            PostListScope::Author(author_id) => {
                qb.push(" AND p.author_id = ");
                qb.push_bind(author_id);
            }
            PostListScope::FollowedBy(user_id) => {
                qb.push(" AND p.author_id IN (SELECT author_id FROM follows WHERE user_id = ");
                qb.push_bind(user_id);
                qb.push(")");
            }
        }
    }

    /// One predicate per recognized criterion; omitted criteria add nothing.
    fn apply_filter_conditions<'q>(qb: &mut QueryBuilder<'q, Sqlite>, filter: &'q PostFilter) {
        if let Some(title) = filter.title_contains.as_ref() {
            qb.push(" AND p.title LIKE '%' || ");
            qb.push_bind(title);
            qb.push(" || '%'");
        }
        if let Some(text) = filter.text_contains.as_ref() {
            qb.push(" AND p.text LIKE '%' || ");
            qb.push_bind(text);
            qb.push(" || '%'");
        }
        if let Some(cost) = filter.cost_lt {
            // NULL cost never matches a cost criterion.
            qb.push(" AND p.cost IS NOT NULL AND p.cost < ");
            qb.push_bind(cost);
        }
        if let Some(date) = filter.pub_date_after {
            // datetime() normalizes away fractional seconds so the midnight
            // bound compares correctly against stored timestamps.
            qb.push(" AND datetime(p.pub_date) > datetime(");
            qb.push_bind(date.midnight().assume_utc());
            qb.push(")");
        }
        if let Some(date) = filter.end_date_before {
            qb.push(" AND p.end_date IS NOT NULL AND p.end_date < ");
            qb.push_bind(date);
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}
