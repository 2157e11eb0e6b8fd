//! Explicit access guards for write operations.
//!
//! Every mutating service call names its guard at the top of the function
//! body. Handlers translate the outcomes into redirects.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("authentication required")]
    Unauthorized,
    #[error("actor does not own post {post_id}")]
    Forbidden { post_id: i64 },
}

/// Require a signed-in actor, yielding their id.
pub fn require_signed_in(viewer: Option<i64>) -> Result<i64, GuardError> {
    viewer.ok_or(GuardError::Unauthorized)
}

/// Require that the actor authored the post being modified.
pub fn require_author(actor_id: i64, author_id: i64, post_id: i64) -> Result<(), GuardError> {
    if actor_id == author_id {
        Ok(())
    } else {
        Err(GuardError::Forbidden { post_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_actor_is_unauthorized() {
        assert_eq!(require_signed_in(None), Err(GuardError::Unauthorized));
        assert_eq!(require_signed_in(Some(7)), Ok(7));
    }

    #[test]
    fn non_author_is_forbidden() {
        assert_eq!(
            require_author(1, 2, 99),
            Err(GuardError::Forbidden { post_id: 99 })
        );
        assert_eq!(require_author(2, 2, 99), Ok(()));
    }
}
