//! Shared fixtures for the integration tests: an in-memory database, a
//! router wired like the production one, and request helpers.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use pluma::application::{
    auth::AuthService,
    feed::{FeedService, ListingSizes},
    follows::FollowService,
    posts::PostService,
    repos::{
        CommentsRepo, CreatePostParams, FollowsRepo, GroupsRepo, PostsRepo, PostsWriteRepo,
        SessionsRepo, UsersRepo,
    },
};
use pluma::cache::{CacheConfig, CacheState};
use pluma::domain::entities::{GroupRecord, PostRecord, UserRecord};
use pluma::infra::db::SqliteRepositories;
use pluma::infra::http::{HttpState, build_router};

pub struct TestApp {
    pub repos: Arc<SqliteRepositories>,
    pub router: Router,
    pub cache: Option<CacheState>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(None).await
}

pub async fn spawn_app_with(cache_config: Option<CacheConfig>) -> TestApp {
    // A single connection keeps every query on the same in-memory database.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse sqlite url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("open in-memory database");
    SqliteRepositories::run_migrations(&pool)
        .await
        .expect("run migrations");

    let repos = Arc::new(SqliteRepositories::new(pool));

    let posts_repo: Arc<dyn PostsRepo> = repos.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repos.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repos.clone();
    let groups_repo: Arc<dyn GroupsRepo> = repos.clone();
    let users_repo: Arc<dyn UsersRepo> = repos.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repos.clone();
    let follows_repo: Arc<dyn FollowsRepo> = repos.clone();

    let feed = Arc::new(FeedService::new(
        posts_repo.clone(),
        comments_repo.clone(),
        groups_repo.clone(),
        users_repo.clone(),
        follows_repo.clone(),
        ListingSizes::default(),
    ));
    let posts = Arc::new(PostService::new(
        posts_repo,
        posts_write_repo,
        comments_repo,
    ));
    let follows = Arc::new(FollowService::new(follows_repo, users_repo.clone()));
    let auth = Arc::new(AuthService::new(users_repo, sessions_repo));

    let cache = cache_config.map(CacheState::new);

    let state = HttpState {
        feed,
        posts,
        follows,
        auth,
        groups: groups_repo,
        db: repos.clone(),
        cache: cache.clone(),
    };

    TestApp {
        repos,
        router: build_router(state),
        cache,
    }
}

impl TestApp {
    /// Insert a user directly, bypassing the password hashing cost.
    pub async fn seed_user(&self, username: &str) -> UserRecord {
        self.repos
            .create_user(username, "unusable-hash")
            .await
            .expect("seed user")
    }

    pub async fn seed_group(&self, title: &str, slug: &str) -> GroupRecord {
        self.repos
            .create_group(title, slug, "")
            .await
            .expect("seed group")
    }

    pub async fn seed_post(&self, author_id: i64, text: &str) -> PostRecord {
        self.seed_post_in_group(author_id, text, None).await
    }

    pub async fn seed_post_in_group(
        &self,
        author_id: i64,
        text: &str,
        group_id: Option<i64>,
    ) -> PostRecord {
        self.repos
            .create_post(CreatePostParams {
                author_id,
                title: None,
                text: text.to_string(),
                group_id,
                address: None,
                cost: None,
                end_date: None,
                image: None,
            })
            .await
            .expect("seed post")
    }

    /// Open a session for the user and return the cookie header value.
    pub async fn session_cookie_for(&self, user_id: i64) -> String {
        let token = self
            .repos
            .create_session(user_id)
            .await
            .expect("open session");
        format!("pluma_session={token}")
    }

    pub async fn get(&self, path: &str) -> Response<Body> {
        self.request("GET", path, None, None).await
    }

    pub async fn get_as(&self, path: &str, cookie: &str) -> Response<Body> {
        self.request("GET", path, Some(cookie), None).await
    }

    pub async fn post_form(&self, path: &str, body: &str) -> Response<Body> {
        self.request("POST", path, None, Some(body)).await
    }

    pub async fn post_form_as(&self, path: &str, cookie: &str, body: &str) -> Response<Body> {
        self.request("POST", path, Some(cookie), Some(body)).await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        cookie: Option<&str>,
        body: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("route request")
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
