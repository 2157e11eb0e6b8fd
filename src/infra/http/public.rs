use std::{collections::HashMap, sync::Arc};

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::{
    application::{
        auth::AuthService,
        feed::{FeedError, FeedService},
        filter::PostFilter,
        follows::{FollowError, FollowService},
        pagination::PageNumber,
        posts::{PostService, WriteError},
        repos::GroupsRepo,
    },
    cache::{CacheState, response_cache_layer},
    domain::entities::UserRecord,
    infra::db::SqliteRepositories,
    presentation::views::{
        FilterFormView, FollowContext, FollowTemplate, GroupContext, GroupTemplate, IndexContext,
        IndexTemplate, LayoutContext, PostDetailContext, PostDetailTemplate,
        PostFormContext, PostFormTemplate, PostFormView, ProfileContext, ProfileTemplate,
        ViewerView, group_options, listing_view, render_not_found_response,
        render_template_response,
    },
};

use super::{
    accounts,
    auth::{current_user, login_redirect},
    db_health_response,
    forms::{CommentForm, PostForm},
    internal_error_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub follows: Arc<FollowService>,
    pub auth: Arc<AuthService>,
    pub groups: Arc<dyn GroupsRepo>,
    pub db: Arc<SqliteRepositories>,
    pub cache: Option<CacheState>,
}

pub fn build_router(state: HttpState) -> Router {
    // Only the anonymous index and group listings are cacheable; everything
    // else is personalized or a write path.
    let cached_routes = Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_posts));

    let cached_routes = if let Some(cache_state) = state.cache.clone() {
        cached_routes.layer(middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ))
    } else {
        cached_routes
    };

    let uncached_routes = Router::new()
        .route("/profile/{username}/", get(profile))
        .route("/posts/{id}/", get(post_detail))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/{id}/edit/", get(post_edit_form).post(post_edit))
        .route("/posts/{id}/comment/", axum::routing::post(add_comment))
        .route("/follow/", get(follow_index))
        .route("/profile/{username}/follow/", get(profile_follow))
        .route("/profile/{username}/unfollow/", get(profile_unfollow))
        .route(
            "/auth/signup/",
            get(accounts::signup_form).post(accounts::signup),
        )
        .route(
            "/auth/login/",
            get(accounts::login_form).post(accounts::login),
        )
        .route("/auth/logout/", get(accounts::logout))
        .route("/_health/db", get(public_health));

    cached_routes
        .merge(uncached_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index(
    State(state): State<HttpState>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let viewer = current_user(&state, &jar).await;
    let filter = PostFilter::from_query(&params);
    let page = PageNumber::parse(params.get("page").map(String::as_str));

    match state.feed.index(&filter, page).await {
        Ok(listing) => {
            let content = IndexContext {
                listing: listing_view(&listing, "/", &filter.query_suffix()),
                filter: FilterFormView::from(&filter),
            };
            let view = layout(&viewer, content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::index", err, &viewer),
    }
}

async fn group_posts(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let viewer = current_user(&state, &jar).await;
    let page = PageNumber::parse(params.get("page").map(String::as_str));

    match state.feed.group(&slug, page).await {
        Ok(group_page) => {
            let base = format!("/group/{slug}/");
            let content = GroupContext::new(
                &group_page.group,
                listing_view(&group_page.listing, &base, ""),
            );
            let view = layout(&viewer, content);
            render_template_response(GroupTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::group_posts", err, &viewer),
    }
}

async fn profile(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(username): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let viewer = current_user(&state, &jar).await;
    let viewer_id = viewer.as_ref().map(|user| user.id);
    let page = PageNumber::parse(params.get("page").map(String::as_str));

    match state.feed.profile(&username, viewer_id, page).await {
        Ok(profile_page) => {
            let base = format!("/profile/{username}/");
            let is_self = viewer_id == Some(profile_page.author.id);
            let following = profile_page.following.unwrap_or(false);
            let content = ProfileContext {
                username: profile_page.author.username.clone(),
                post_count: profile_page.post_count,
                show_follow: !is_self && viewer_id.is_some() && !following,
                show_unfollow: !is_self && following,
                listing: listing_view(&profile_page.listing, &base, ""),
            };
            let view = layout(&viewer, content);
            render_template_response(ProfileTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::profile", err, &viewer),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Response {
    let viewer = current_user(&state, &jar).await;

    match state.feed.post_detail(id).await {
        Ok(detail) => {
            let can_edit = viewer.as_ref().map(|user| user.id) == Some(detail.item.post.author_id);
            let content = PostDetailContext {
                post: (&detail.item).into(),
                author_post_count: detail.author_post_count,
                comments: detail.comments.iter().map(Into::into).collect(),
                can_edit,
            };
            let view = layout(&viewer, content);
            render_template_response(PostDetailTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::post_detail", err, &viewer),
    }
}

async fn follow_index(
    State(state): State<HttpState>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let viewer = current_user(&state, &jar).await;
    let Some(viewer_id) = viewer.as_ref().map(|user| user.id) else {
        return login_redirect("/follow/");
    };
    let page = PageNumber::parse(params.get("page").map(String::as_str));

    match state.feed.followed(viewer_id, page).await {
        Ok(listing) => {
            let content = FollowContext {
                listing: listing_view(&listing, "/follow/", ""),
            };
            let view = layout(&viewer, content);
            render_template_response(FollowTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::follow_index", err, &viewer),
    }
}

async fn post_create_form(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let viewer = current_user(&state, &jar).await;
    if viewer.is_none() {
        return login_redirect("/create/");
    }
    render_post_form(
        &state,
        &viewer,
        false,
        "/create/",
        PostFormView::default(),
        Vec::new(),
        StatusCode::OK,
    )
    .await
}

async fn post_create(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> Response {
    const SOURCE: &str = "infra::http::public::post_create";

    let viewer = current_user(&state, &jar).await;
    let viewer_id = viewer.as_ref().map(|user| user.id);

    match state.posts.create_post(viewer_id, form.draft()).await {
        Ok(post) => {
            invalidate_listings(&state, [post.group_id]).await;
            let username = viewer
                .as_ref()
                .map(|user| user.username.as_str())
                .unwrap_or_default();
            Redirect::to(&format!("/profile/{username}/")).into_response()
        }
        Err(WriteError::Unauthorized) => login_redirect("/create/"),
        Err(WriteError::Validation(message)) => {
            render_post_form(
                &state,
                &viewer,
                false,
                "/create/",
                form.view(),
                vec![message],
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
        Err(err) => write_error_to_response(SOURCE, err, "/create/", &viewer),
    }
}

async fn post_edit_form(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Response {
    const SOURCE: &str = "infra::http::public::post_edit_form";

    let viewer = current_user(&state, &jar).await;
    let viewer_id = viewer.as_ref().map(|user| user.id);

    match state.posts.post_for_edit(viewer_id, id).await {
        Ok(post) => {
            render_post_form(
                &state,
                &viewer,
                true,
                &format!("/posts/{id}/edit/"),
                PostFormView::from_record(&post),
                Vec::new(),
                StatusCode::OK,
            )
            .await
        }
        Err(err) => {
            write_error_to_response(SOURCE, err, &format!("/posts/{id}/edit/"), &viewer)
        }
    }
}

async fn post_edit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Response {
    const SOURCE: &str = "infra::http::public::post_edit";

    let viewer = current_user(&state, &jar).await;
    let viewer_id = viewer.as_ref().map(|user| user.id);

    // The previous group's listing goes stale too when the post moves.
    let previous_group = match state.posts.post_for_edit(viewer_id, id).await {
        Ok(post) => post.group_id,
        Err(err) => {
            return write_error_to_response(SOURCE, err, &format!("/posts/{id}/edit/"), &viewer);
        }
    };

    match state.posts.edit_post(viewer_id, id, form.draft()).await {
        Ok(post) => {
            invalidate_listings(&state, [previous_group, post.group_id]).await;
            Redirect::to(&format!("/posts/{id}/")).into_response()
        }
        Err(WriteError::Validation(message)) => {
            render_post_form(
                &state,
                &viewer,
                true,
                &format!("/posts/{id}/edit/"),
                form.view(),
                vec![message],
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
        Err(err) => {
            write_error_to_response(SOURCE, err, &format!("/posts/{id}/edit/"), &viewer)
        }
    }
}

async fn add_comment(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Response {
    const SOURCE: &str = "infra::http::public::add_comment";

    let viewer = current_user(&state, &jar).await;
    let viewer_id = viewer.as_ref().map(|user| user.id);

    match state.posts.add_comment(viewer_id, id, form.draft()).await {
        // A rejected draft redirects the same way a stored comment does.
        Ok(_) => Redirect::to(&format!("/posts/{id}/")).into_response(),
        Err(WriteError::Unauthorized) => login_redirect(&format!("/posts/{id}/comment/")),
        Err(err) => write_error_to_response(SOURCE, err, &format!("/posts/{id}/"), &viewer),
    }
}

async fn profile_follow(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(username): Path<String>,
) -> Response {
    const SOURCE: &str = "infra::http::public::profile_follow";

    let viewer = current_user(&state, &jar).await;
    let viewer_id = viewer.as_ref().map(|user| user.id);

    match state.follows.follow(viewer_id, &username).await {
        Ok(()) => Redirect::to(&format!("/profile/{username}/")).into_response(),
        Err(err) => {
            follow_error_to_response(SOURCE, err, &format!("/profile/{username}/follow/"), &viewer)
        }
    }
}

async fn profile_unfollow(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(username): Path<String>,
) -> Response {
    const SOURCE: &str = "infra::http::public::profile_unfollow";

    let viewer = current_user(&state, &jar).await;
    let viewer_id = viewer.as_ref().map(|user| user.id);

    match state.follows.unfollow(viewer_id, &username).await {
        Ok(()) => Redirect::to(&format!("/profile/{username}/")).into_response(),
        Err(err) => {
            follow_error_to_response(
                SOURCE,
                err,
                &format!("/profile/{username}/unfollow/"),
                &viewer,
            )
        }
    }
}

async fn not_found(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let viewer = current_user(&state, &jar).await;
    render_not_found_response(viewer.as_ref().map(ViewerView::from))
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

fn layout<T>(viewer: &Option<UserRecord>, content: T) -> LayoutContext<T> {
    LayoutContext::new(viewer.as_ref().map(ViewerView::from), content)
}

async fn render_post_form(
    state: &HttpState,
    viewer: &Option<UserRecord>,
    is_edit: bool,
    action: &str,
    form: PostFormView,
    errors: Vec<String>,
    status: StatusCode,
) -> Response {
    let groups = match state.groups.list_groups().await {
        Ok(groups) => groups,
        Err(err) => {
            return internal_error_response("infra::http::public::render_post_form", &err);
        }
    };
    let content = PostFormContext {
        is_edit,
        action: action.to_string(),
        groups: group_options(&groups, form.group_id),
        form,
        errors,
    };
    let view = layout(viewer, content);
    render_template_response(PostFormTemplate { view }, status)
}

/// Drop the cached index and any group listings touched by a post write.
async fn invalidate_listings(
    state: &HttpState,
    group_ids: impl IntoIterator<Item = Option<i64>>,
) {
    let Some(cache) = &state.cache else {
        return;
    };
    let ids: Vec<i64> = group_ids.into_iter().flatten().collect();
    let slugs: Vec<String> = if ids.is_empty() {
        Vec::new()
    } else {
        match state.groups.list_groups().await {
            Ok(groups) => groups
                .into_iter()
                .filter(|group| ids.contains(&group.id))
                .map(|group| group.slug)
                .collect(),
            Err(err) => {
                warn!(
                    target = "pluma::http::cache",
                    error = %err,
                    "failed to resolve group slugs; dropping the whole cache"
                );
                cache.store.clear();
                return;
            }
        }
    };
    cache
        .store
        .invalidate_post_listings(slugs.iter().map(String::as_str));
}

fn feed_error_to_response(
    source: &'static str,
    err: FeedError,
    viewer: &Option<UserRecord>,
) -> Response {
    match err {
        FeedError::NotFound => render_not_found_response(viewer.as_ref().map(ViewerView::from)),
        FeedError::Repo(err) => internal_error_response(source, &err),
    }
}

fn write_error_to_response(
    source: &'static str,
    err: WriteError,
    next: &str,
    viewer: &Option<UserRecord>,
) -> Response {
    match err {
        WriteError::Unauthorized => login_redirect(next),
        WriteError::Forbidden { post_id } => {
            Redirect::to(&format!("/posts/{post_id}/")).into_response()
        }
        WriteError::NotFound => render_not_found_response(viewer.as_ref().map(ViewerView::from)),
        WriteError::Validation(_) | WriteError::Repo(_) => internal_error_response(source, &err),
    }
}

fn follow_error_to_response(
    source: &'static str,
    err: FollowError,
    next: &str,
    viewer: &Option<UserRecord>,
) -> Response {
    match err {
        FollowError::Unauthorized => login_redirect(next),
        FollowError::NotFound => render_not_found_response(viewer.as_ref().map(ViewerView::from)),
        FollowError::Repo(err) => internal_error_response(source, &err),
    }
}
