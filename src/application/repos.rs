//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;

use crate::application::filter::PostFilter;
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint: {constraint}")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("integrity error: {message}")]
    Integrity { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Restriction applied to a post listing before filters.
#[derive(Debug, Clone, Copy)]
pub enum PostListScope {
    /// Every post.
    All,
    /// Posts attached to one group.
    Group(i64),
    /// Posts written by one author.
    Author(i64),
    /// Posts written by anyone the given user follows.
    FollowedBy(i64),
}

/// Window into an ordered listing, produced by the paginator.
#[derive(Debug, Clone, Copy)]
pub struct ListWindow {
    pub limit: u64,
    pub offset: u64,
}

/// A post joined with the display fields its listings need.
#[derive(Debug, Clone, PartialEq)]
pub struct PostListItem {
    pub post: PostRecord,
    pub author_username: String,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentListItem {
    pub comment: CommentRecord,
    pub author_username: String,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub author_id: i64,
    pub title: Option<String>,
    pub text: String,
    pub group_id: Option<i64>,
    pub address: Option<String>,
    pub cost: Option<i64>,
    pub end_date: Option<Date>,
    pub image: Option<String>,
}

/// Editable fields of an existing post. `pub_date` and `author_id` are
/// deliberately absent; edits cannot touch them.
#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: i64,
    pub title: Option<String>,
    pub text: String,
    pub group_id: Option<i64>,
    pub address: Option<String>,
    pub cost: Option<i64>,
    pub end_date: Option<Date>,
    pub image: Option<String>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// List posts in descending publication order, restricted by scope and
    /// filter, sliced to the given window.
    async fn list_posts(
        &self,
        scope: PostListScope,
        filter: &PostFilter,
        window: ListWindow,
    ) -> Result<Vec<PostListItem>, RepoError>;

    async fn count_posts(
        &self,
        scope: PostListScope,
        filter: &PostFilter,
    ) -> Result<u64, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PostListItem>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<CommentRecord, RepoError>;

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentListItem>, RepoError>;

    async fn count_for_post(&self, post_id: i64) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait GroupsRepo: Send + Sync {
    async fn create_group(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> Result<GroupRecord, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError>;

    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError>;

    async fn delete_group(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserRecord, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError>;

    async fn delete_user(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    /// Create a session and return its opaque token.
    async fn create_session(&self, user_id: i64) -> Result<String, RepoError>;

    async fn find_user_by_session(&self, token: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn delete_session(&self, token: &str) -> Result<(), RepoError>;
}

#[async_trait]
pub trait FollowsRepo: Send + Sync {
    /// Create the edge if absent. Idempotent: an existing edge is a no-op.
    async fn follow(&self, user_id: i64, author_id: i64) -> Result<(), RepoError>;

    /// Delete the edge if present. An absent edge is a no-op.
    async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<(), RepoError>;

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;
}
