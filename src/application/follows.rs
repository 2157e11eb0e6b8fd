//! Follow and unfollow between users.

use std::sync::Arc;

use thiserror::Error;

use crate::application::guards::{self, GuardError};
use crate::application::repos::{FollowsRepo, RepoError, UsersRepo};

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("authentication required")]
    Unauthorized,
    #[error("author not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<GuardError> for FollowError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthorized => Self::Unauthorized,
            // No ownership guard exists on this path.
            GuardError::Forbidden { .. } => Self::Unauthorized,
        }
    }
}

pub struct FollowService {
    follows: Arc<dyn FollowsRepo>,
    users: Arc<dyn UsersRepo>,
}

impl FollowService {
    pub fn new(follows: Arc<dyn FollowsRepo>, users: Arc<dyn UsersRepo>) -> Self {
        Self { follows, users }
    }

    /// Follow the named author. Following yourself or an author you already
    /// follow changes nothing.
    pub async fn follow(&self, viewer: Option<i64>, username: &str) -> Result<(), FollowError> {
        let actor_id = guards::require_signed_in(viewer)?;
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(FollowError::NotFound)?;
        if author.id == actor_id {
            return Ok(());
        }
        self.follows.follow(actor_id, author.id).await?;
        Ok(())
    }

    /// Unfollow the named author. An absent edge is a no-op.
    pub async fn unfollow(&self, viewer: Option<i64>, username: &str) -> Result<(), FollowError> {
        let actor_id = guards::require_signed_in(viewer)?;
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(FollowError::NotFound)?;
        self.follows.unfollow(actor_id, author.id).await?;
        Ok(())
    }
}
