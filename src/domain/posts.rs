//! Post and comment drafts with field-level validation.

use time::Date;

use crate::domain::error::DomainError;

/// Upper bound on post titles, counted in characters.
pub const TITLE_MAX_CHARS: usize = 40;

/// Editable fields of a post, as submitted by a user.
///
/// The author and publication timestamp are never part of a draft; they are
/// assigned by the write path at creation and stay fixed across edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub title: Option<String>,
    pub text: String,
    pub group_id: Option<i64>,
    pub address: Option<String>,
    pub cost: Option<i64>,
    pub end_date: Option<Date>,
    pub image: Option<String>,
}

impl PostDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::validation("post text must not be empty"));
        }
        if let Some(title) = &self.title
            && title.chars().count() > TITLE_MAX_CHARS
        {
            return Err(DomainError::validation(format!(
                "post title must not exceed {TITLE_MAX_CHARS} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentDraft {
    pub text: String,
}

impl CommentDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::validation("comment text must not be empty"));
        }
        Ok(())
    }
}
