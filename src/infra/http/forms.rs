//! HTML form payloads and their conversion into drafts.
//!
//! Optional numeric and date fields are permissive: a value that fails to
//! parse is treated as absent, matching the listing filter boundary.

use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::domain::posts::{CommentDraft, PostDraft};
use crate::presentation::views::PostFormView;

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub group: String,
    pub address: String,
    pub cost: String,
    pub end_date: String,
    pub image: String,
}

impl PostForm {
    pub fn draft(&self) -> PostDraft {
        PostDraft {
            title: non_blank(&self.title),
            text: self.text.clone(),
            group_id: self.group.trim().parse().ok(),
            address: non_blank(&self.address),
            cost: self.cost.trim().parse().ok(),
            end_date: Date::parse(self.end_date.trim(), DATE_FORMAT).ok(),
            image: non_blank(&self.image),
        }
    }

    /// Echo the submitted values back into the form on validation failure.
    pub fn view(&self) -> PostFormView {
        PostFormView {
            title: self.title.clone(),
            text: self.text.clone(),
            group_id: self.group.trim().parse().ok(),
            address: self.address.clone(),
            cost: self.cost.clone(),
            end_date: self.end_date.clone(),
            image: self.image.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn draft(&self) -> CommentDraft {
        CommentDraft {
            text: self.text.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn post_form_parses_optional_fields() {
        let form = PostForm {
            title: "  Garage sale  ".to_string(),
            text: "Everything must go".to_string(),
            group: "3".to_string(),
            cost: "250".to_string(),
            end_date: "2024-06-01".to_string(),
            ..Default::default()
        };
        let draft = form.draft();
        assert_eq!(draft.title.as_deref(), Some("Garage sale"));
        assert_eq!(draft.group_id, Some(3));
        assert_eq!(draft.cost, Some(250));
        assert_eq!(draft.end_date, Some(date!(2024 - 06 - 01)));
        assert_eq!(draft.address, None);
    }

    #[test]
    fn unparsable_optional_fields_are_dropped() {
        let form = PostForm {
            text: "body".to_string(),
            group: "".to_string(),
            cost: "free".to_string(),
            end_date: "soon".to_string(),
            ..Default::default()
        };
        let draft = form.draft();
        assert_eq!(draft.group_id, None);
        assert_eq!(draft.cost, None);
        assert_eq!(draft.end_date, None);
    }
}
