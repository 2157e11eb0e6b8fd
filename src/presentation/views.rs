//! View models and askama templates for the public pages.
//!
//! Handlers assemble a `LayoutContext` around a per-page content struct;
//! formatting of dates and option fields happens here so the templates stay
//! declarative.

use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::{Date, OffsetDateTime, macros::format_description};

use crate::application::error::{ErrorReport, HttpError};
use crate::application::feed::PostListPage;
use crate::application::pagination::Page;
use crate::application::repos::{CommentListItem, PostListItem};
use crate::domain::entities::{GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(viewer: Option<ViewerView>) -> Response {
    let view = LayoutContext::new(viewer, ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// The signed-in user, as the layout chrome shows them.
#[derive(Clone)]
pub struct ViewerView {
    pub username: String,
}

impl From<&UserRecord> for ViewerView {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub viewer: Option<ViewerView>,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(viewer: Option<ViewerView>, content: T) -> Self {
        Self { viewer, content }
    }
}

#[derive(Clone)]
pub struct PostCard {
    pub id: i64,
    pub title: Option<String>,
    pub text: String,
    pub author_username: String,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
    pub published: String,
    pub address: Option<String>,
    pub cost: Option<i64>,
    pub end_date: Option<String>,
    pub image: Option<String>,
}

impl From<&PostListItem> for PostCard {
    fn from(item: &PostListItem) -> Self {
        Self {
            id: item.post.id,
            title: item.post.title.clone(),
            text: item.post.text.clone(),
            author_username: item.author_username.clone(),
            group_title: item.group_title.clone(),
            group_slug: item.group_slug.clone(),
            published: format_datetime(item.post.pub_date),
            address: item.post.address.clone(),
            cost: item.post.cost,
            end_date: item.post.end_date.map(format_date),
            image: item.post.image.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CommentView {
    pub author_username: String,
    pub created: String,
    pub text: String,
}

impl From<&CommentListItem> for CommentView {
    fn from(item: &CommentListItem) -> Self {
        Self {
            author_username: item.author_username.clone(),
            created: format_datetime(item.comment.created),
            text: item.comment.text.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PaginationView {
    pub current: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_href: String,
    pub next_href: String,
}

/// Navigation links keep the active filter criteria via the query suffix.
pub fn pagination_view(page: &Page, base_path: &str, query_suffix: &str) -> PaginationView {
    let href = |number: u32| format!("{base_path}?page={number}{query_suffix}");
    PaginationView {
        current: page.number,
        total_pages: page.total_pages,
        has_previous: page.has_previous,
        has_next: page.has_next,
        previous_href: href(page.number.saturating_sub(1).max(1)),
        next_href: href(page.number + 1),
    }
}

#[derive(Clone)]
pub struct ListingView {
    pub posts: Vec<PostCard>,
    pub pagination: PaginationView,
    pub total: u64,
}

pub fn listing_view(listing: &PostListPage, base_path: &str, query_suffix: &str) -> ListingView {
    ListingView {
        posts: listing.items.iter().map(PostCard::from).collect(),
        pagination: pagination_view(&listing.page, base_path, query_suffix),
        total: listing.total,
    }
}

/// Current filter values echoed back into the index search form.
#[derive(Clone, Default)]
pub struct FilterFormView {
    pub title: String,
    pub text: String,
    pub cost_lt: String,
    pub date_start: String,
    pub date_end: String,
}

impl From<&crate::application::filter::PostFilter> for FilterFormView {
    fn from(filter: &crate::application::filter::PostFilter) -> Self {
        Self {
            title: filter.title_contains.clone().unwrap_or_default(),
            text: filter.text_contains.clone().unwrap_or_default(),
            cost_lt: filter.cost_lt.map(|c| c.to_string()).unwrap_or_default(),
            date_start: filter.pub_date_after.map(format_date).unwrap_or_default(),
            date_end: filter.end_date_before.map(format_date).unwrap_or_default(),
        }
    }
}

pub struct IndexContext {
    pub listing: ListingView,
    pub filter: FilterFormView,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexContext>,
}

pub struct GroupContext {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub listing: ListingView,
}

impl GroupContext {
    pub fn new(group: &GroupRecord, listing: ListingView) -> Self {
        Self {
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
            listing,
        }
    }
}

#[derive(Template)]
#[template(path = "group.html")]
pub struct GroupTemplate {
    pub view: LayoutContext<GroupContext>,
}

pub struct ProfileContext {
    pub username: String,
    pub post_count: u64,
    /// Follow controls are offered only to signed-in viewers looking at
    /// someone else's profile.
    pub show_follow: bool,
    pub show_unfollow: bool,
    pub listing: ListingView,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub view: LayoutContext<ProfileContext>,
}

pub struct FollowContext {
    pub listing: ListingView,
}

#[derive(Template)]
#[template(path = "follow.html")]
pub struct FollowTemplate {
    pub view: LayoutContext<FollowContext>,
}

pub struct PostDetailContext {
    pub post: PostCard,
    pub author_post_count: u64,
    pub comments: Vec<CommentView>,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

#[derive(Clone, Default)]
pub struct PostFormView {
    pub title: String,
    pub text: String,
    pub group_id: Option<i64>,
    pub address: String,
    pub cost: String,
    pub end_date: String,
    pub image: String,
}

impl PostFormView {
    pub fn from_record(post: &PostRecord) -> Self {
        Self {
            title: post.title.clone().unwrap_or_default(),
            text: post.text.clone(),
            group_id: post.group_id,
            address: post.address.clone().unwrap_or_default(),
            cost: post.cost.map(|c| c.to_string()).unwrap_or_default(),
            end_date: post.end_date.map(format_date).unwrap_or_default(),
            image: post.image.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct GroupOptionView {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

pub fn group_options(groups: &[GroupRecord], selected: Option<i64>) -> Vec<GroupOptionView> {
    groups
        .iter()
        .map(|group| GroupOptionView {
            id: group.id,
            title: group.title.clone(),
            selected: selected == Some(group.id),
        })
        .collect()
}

pub struct PostFormContext {
    pub is_edit: bool,
    pub action: String,
    pub form: PostFormView,
    pub groups: Vec<GroupOptionView>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub view: LayoutContext<PostFormContext>,
}

pub struct LoginContext {
    pub username: String,
    pub next: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub view: LayoutContext<LoginContext>,
}

pub struct SignupContext {
    pub username: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub view: LayoutContext<SignupContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage."
                .to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

const DATETIME_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");
const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub fn format_datetime(value: OffsetDateTime) -> String {
    value
        .format(DATETIME_FORMAT)
        .unwrap_or_else(|_| value.to_string())
}

pub fn format_date(value: Date) -> String {
    value
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| value.to_string())
}
