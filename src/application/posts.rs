//! Write paths for posts and comments.

use std::sync::Arc;

use thiserror::Error;

use crate::application::guards::{self, GuardError};
use crate::application::repos::{
    CommentsRepo, CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{CommentRecord, PostRecord};
use crate::domain::error::DomainError;
use crate::domain::posts::{CommentDraft, PostDraft};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("authentication required")]
    Unauthorized,
    #[error("actor does not own post {post_id}")]
    Forbidden { post_id: i64 },
    #[error("resource not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<GuardError> for WriteError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthorized => Self::Unauthorized,
            GuardError::Forbidden { post_id } => Self::Forbidden { post_id },
        }
    }
}

impl From<DomainError> for WriteError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => Self::NotFound,
            DomainError::Validation { message } => Self::Validation(message),
        }
    }
}

pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    writes: Arc<dyn PostsWriteRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        writes: Arc<dyn PostsWriteRepo>,
        comments: Arc<dyn CommentsRepo>,
    ) -> Self {
        Self {
            posts,
            writes,
            comments,
        }
    }

    /// Create a post authored by the signed-in actor. `pub_date` is set by
    /// the store at insertion and never changes afterwards.
    pub async fn create_post(
        &self,
        viewer: Option<i64>,
        draft: PostDraft,
    ) -> Result<PostRecord, WriteError> {
        let actor_id = guards::require_signed_in(viewer)?;
        draft.validate()?;
        let created = self
            .writes
            .create_post(CreatePostParams {
                author_id: actor_id,
                title: draft.title,
                text: draft.text,
                group_id: draft.group_id,
                address: draft.address,
                cost: draft.cost,
                end_date: draft.end_date,
                image: draft.image,
            })
            .await?;
        Ok(created)
    }

    /// Edit an existing post. Only the author may modify it; the update never
    /// touches `pub_date` or authorship.
    pub async fn edit_post(
        &self,
        viewer: Option<i64>,
        post_id: i64,
        draft: PostDraft,
    ) -> Result<PostRecord, WriteError> {
        let actor_id = guards::require_signed_in(viewer)?;
        let existing = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(WriteError::NotFound)?;
        guards::require_author(actor_id, existing.post.author_id, post_id)?;
        draft.validate()?;
        let updated = self
            .writes
            .update_post(UpdatePostParams {
                id: post_id,
                title: draft.title,
                text: draft.text,
                group_id: draft.group_id,
                address: draft.address,
                cost: draft.cost,
                end_date: draft.end_date,
                image: draft.image,
            })
            .await?;
        Ok(updated)
    }

    /// Fetch a post for the edit form, enforcing ownership up front so the
    /// GET and POST sides of the form behave identically.
    pub async fn post_for_edit(
        &self,
        viewer: Option<i64>,
        post_id: i64,
    ) -> Result<PostRecord, WriteError> {
        let actor_id = guards::require_signed_in(viewer)?;
        let existing = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(WriteError::NotFound)?;
        guards::require_author(actor_id, existing.post.author_id, post_id)?;
        Ok(existing.post)
    }

    /// Attach a comment to a post. Invalid input produces no comment and no
    /// error: the caller redirects back to the detail view either way.
    pub async fn add_comment(
        &self,
        viewer: Option<i64>,
        post_id: i64,
        draft: CommentDraft,
    ) -> Result<Option<CommentRecord>, WriteError> {
        let actor_id = guards::require_signed_in(viewer)?;
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(WriteError::NotFound);
        }
        if draft.validate().is_err() {
            return Ok(None);
        }
        let comment = self
            .comments
            .create_comment(post_id, actor_id, &draft.text)
            .await?;
        Ok(Some(comment))
    }
}
