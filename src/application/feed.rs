//! Read paths over the post listings: index, group, profile, follow feed,
//! and the single-post detail view.

use std::sync::Arc;

use thiserror::Error;

use crate::application::filter::PostFilter;
use crate::application::pagination::{Page, PageNumber, Paginator};
use crate::application::repos::{
    CommentListItem, CommentsRepo, FollowsRepo, GroupsRepo, ListWindow, PostListItem,
    PostListScope, PostsRepo, RepoError, UsersRepo,
};
use crate::domain::entities::{GroupRecord, UserRecord};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("resource not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Page sizes per listing; each listing reads its own constant from settings.
#[derive(Debug, Clone, Copy)]
pub struct ListingSizes {
    pub index: u32,
    pub group: u32,
    pub profile: u32,
    pub follow: u32,
}

impl Default for ListingSizes {
    fn default() -> Self {
        Self {
            index: 10,
            group: 10,
            profile: 10,
            follow: 10,
        }
    }
}

/// One resolved page of a post listing.
#[derive(Debug, Clone)]
pub struct PostListPage {
    pub items: Vec<PostListItem>,
    pub page: Page,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct GroupPage {
    pub group: GroupRecord,
    pub listing: PostListPage,
}

#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub author: UserRecord,
    pub post_count: u64,
    /// Whether the viewer follows this author; `None` for anonymous viewers.
    pub following: Option<bool>,
    pub listing: PostListPage,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub item: PostListItem,
    /// The author's total post count, shown alongside the post.
    pub author_post_count: u64,
    pub comments: Vec<CommentListItem>,
}

pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
    groups: Arc<dyn GroupsRepo>,
    users: Arc<dyn UsersRepo>,
    follows: Arc<dyn FollowsRepo>,
    sizes: ListingSizes,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        comments: Arc<dyn CommentsRepo>,
        groups: Arc<dyn GroupsRepo>,
        users: Arc<dyn UsersRepo>,
        follows: Arc<dyn FollowsRepo>,
        sizes: ListingSizes,
    ) -> Self {
        Self {
            posts,
            comments,
            groups,
            users,
            follows,
            sizes,
        }
    }

    /// The front page: every post, newest first, optionally filtered.
    pub async fn index(
        &self,
        filter: &PostFilter,
        page: PageNumber,
    ) -> Result<PostListPage, FeedError> {
        self.listing(PostListScope::All, filter, self.sizes.index, page)
            .await
    }

    /// Posts belonging to one group, resolved by slug.
    pub async fn group(&self, slug: &str, page: PageNumber) -> Result<GroupPage, FeedError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or(FeedError::NotFound)?;
        let listing = self
            .listing(
                PostListScope::Group(group.id),
                &PostFilter::default(),
                self.sizes.group,
                page,
            )
            .await?;
        Ok(GroupPage { group, listing })
    }

    /// One author's posts, with the viewer's follow status when signed in.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<i64>,
        page: PageNumber,
    ) -> Result<ProfilePage, FeedError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(FeedError::NotFound)?;
        let listing = self
            .listing(
                PostListScope::Author(author.id),
                &PostFilter::default(),
                self.sizes.profile,
                page,
            )
            .await?;
        let following = match viewer {
            Some(viewer_id) => Some(self.follows.is_following(viewer_id, author.id).await?),
            None => None,
        };
        Ok(ProfilePage {
            post_count: listing.total,
            author,
            following,
            listing,
        })
    }

    /// Posts authored by anyone the viewer follows.
    pub async fn followed(
        &self,
        viewer_id: i64,
        page: PageNumber,
    ) -> Result<PostListPage, FeedError> {
        self.listing(
            PostListScope::FollowedBy(viewer_id),
            &PostFilter::default(),
            self.sizes.follow,
            page,
        )
        .await
    }

    /// A single post with its comments and the author's post count.
    pub async fn post_detail(&self, id: i64) -> Result<PostDetail, FeedError> {
        let item = self.posts.find_by_id(id).await?.ok_or(FeedError::NotFound)?;
        let author_post_count = self
            .posts
            .count_posts(
                PostListScope::Author(item.post.author_id),
                &PostFilter::default(),
            )
            .await?;
        let comments = self.comments.list_for_post(id).await?;
        Ok(PostDetail {
            item,
            author_post_count,
            comments,
        })
    }

    async fn listing(
        &self,
        scope: PostListScope,
        filter: &PostFilter,
        page_size: u32,
        requested: PageNumber,
    ) -> Result<PostListPage, FeedError> {
        let total = self.posts.count_posts(scope, filter).await?;
        let page = Paginator::new(page_size).page(total, requested);
        let items = self
            .posts
            .list_posts(
                scope,
                filter,
                ListWindow {
                    limit: page.limit,
                    offset: page.offset,
                },
            )
            .await?;
        Ok(PostListPage { items, page, total })
    }
}
