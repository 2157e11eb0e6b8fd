//! Listing response cache behavior through the HTTP surface.

mod support;

use axum::http::StatusCode;

use pluma::cache::CacheConfig;
use support::{body_string, spawn_app, spawn_app_with};

fn long_ttl() -> CacheConfig {
    CacheConfig {
        enabled: true,
        response_limit: 16,
        ttl_ms: 60_000,
    }
}

#[tokio::test]
async fn index_is_served_from_cache_within_ttl() {
    let app = spawn_app_with(Some(long_ttl())).await;
    let author = app.seed_user("poster").await;
    app.seed_post(author.id, "the cached post").await;

    let first = body_string(app.get("/").await).await;
    assert!(first.contains("the cached post"));
    assert_eq!(app.cache.as_ref().unwrap().store.len(), 1);

    // Seeding through the repository skips the handlers, so nothing
    // invalidates the cached page.
    app.seed_post(author.id, "a newer post").await;

    let second = body_string(app.get("/").await).await;
    assert!(!second.contains("a newer post"));
    assert_eq!(second, first);
}

#[tokio::test]
async fn post_creation_invalidates_the_index() {
    let app = spawn_app_with(Some(long_ttl())).await;
    let user = app.seed_user("poster").await;
    let cookie = app.session_cookie_for(user.id).await;

    let before = body_string(app.get("/").await).await;
    assert!(before.contains("No posts yet."));

    let response = app
        .post_form_as("/create/", &cookie, "text=hot+off+the+press")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let after = body_string(app.get("/").await).await;
    assert!(after.contains("hot off the press"));
}

#[tokio::test]
async fn post_creation_invalidates_its_group_listing() {
    let app = spawn_app_with(Some(long_ttl())).await;
    let user = app.seed_user("poster").await;
    let group = app.seed_group("Cats", "cats").await;
    let cookie = app.session_cookie_for(user.id).await;

    let before = body_string(app.get("/group/cats/").await).await;
    assert!(before.contains("No posts yet."));

    app.post_form_as(
        "/create/",
        &cookie,
        &format!("text=feline+news&group={}", group.id),
    )
    .await;

    let after = body_string(app.get("/group/cats/").await).await;
    assert!(after.contains("feline news"));
}

#[tokio::test]
async fn signed_in_requests_bypass_the_cache() {
    let app = spawn_app_with(Some(long_ttl())).await;
    let user = app.seed_user("member").await;
    let cookie = app.session_cookie_for(user.id).await;

    // Prime the cache with the anonymous rendering.
    let anonymous = body_string(app.get("/").await).await;
    assert!(!anonymous.contains("class=\"viewer\""));

    let personalized = body_string(app.get_as("/", &cookie).await).await;
    assert!(personalized.contains("class=\"viewer\">member"));

    // The cached anonymous page is untouched.
    let anonymous_again = body_string(app.get("/").await).await;
    assert_eq!(anonymous_again, anonymous);
}

#[tokio::test]
async fn expired_entries_are_rendered_fresh() {
    let app = spawn_app_with(Some(CacheConfig {
        enabled: true,
        response_limit: 16,
        ttl_ms: 0,
    }))
    .await;
    let author = app.seed_user("poster").await;

    let before = body_string(app.get("/").await).await;
    assert!(before.contains("No posts yet."));

    app.seed_post(author.id, "brand new").await;

    let after = body_string(app.get("/").await).await;
    assert!(after.contains("brand new"));
}

#[tokio::test]
async fn only_index_and_group_listings_are_cached() {
    let app = spawn_app_with(Some(long_ttl())).await;
    let author = app.seed_user("poster").await;
    app.seed_group("Cats", "cats").await;
    app.seed_post(author.id, "a post").await;

    app.get("/").await;
    app.get("/group/cats/").await;
    app.get("/profile/poster/").await;
    app.get(&format!("/posts/{}/", 1)).await;

    assert_eq!(app.cache.as_ref().unwrap().store.len(), 2);
}

#[tokio::test]
async fn disabled_cache_stores_nothing() {
    let app = spawn_app().await;
    let author = app.seed_user("poster").await;
    app.seed_post(author.id, "visible immediately").await;

    let first = body_string(app.get("/").await).await;
    assert!(first.contains("visible immediately"));

    app.seed_post(author.id, "also visible").await;
    let second = body_string(app.get("/").await).await;
    assert!(second.contains("also visible"));
}
