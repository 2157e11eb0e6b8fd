//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub joined_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// A user-authored entry. `pub_date` is assigned once at creation and never
/// changes afterwards; edits only touch the remaining fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
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

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: OffsetDateTime,
}

/// Directed edge: `user` follows `author`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FollowRecord {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}
