//! Row types decoded from SQLite and their conversions into records.

use time::{Date, OffsetDateTime};

use crate::application::repos::{CommentListItem, PostListItem};
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

pub const POST_COLUMNS: &str = "p.id, p.title, p.text, p.pub_date, p.group_id, p.author_id, \
     p.address, p.cost, p.end_date, p.image";

#[derive(sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: Option<String>,
    pub text: String,
    pub pub_date: OffsetDateTime,
    pub group_id: Option<i64>,
    pub author_id: i64,
    pub address: Option<String>,
    pub cost: Option<i64>,
    pub end_date: Option<Date>,
    pub image: Option<String>,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            text: row.text,
            pub_date: row.pub_date,
            group_id: row.group_id,
            author_id: row.author_id,
            address: row.address,
            cost: row.cost,
            end_date: row.end_date,
            image: row.image,
        }
    }
}

/// A post joined with its author's username and group display fields.
#[derive(sqlx::FromRow)]
pub struct PostListRow {
    #[sqlx(flatten)]
    pub post: PostRow,
    pub author_username: String,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

impl From<PostListRow> for PostListItem {
    fn from(row: PostListRow) -> Self {
        Self {
            post: row.post.into(),
            author_username: row.author_username,
            group_title: row.group_title,
            group_slug: row.group_slug,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: OffsetDateTime,
    pub author_username: String,
}

impl From<CommentRow> for CommentListItem {
    fn from(row: CommentRow) -> Self {
        Self {
            comment: CommentRecord {
                id: row.id,
                post_id: row.post_id,
                author_id: row.author_id,
                text: row.text,
                created: row.created,
            },
            author_username: row.author_username,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub joined_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            joined_at: row.joined_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct GroupRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<GroupRow> for GroupRecord {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
        }
    }
}
