//! Account lifecycle and the follow graph.

mod support;

use axum::http::{StatusCode, header};

use pluma::application::repos::FollowsRepo;
use support::{body_string, count_occurrences, location, spawn_app};

fn set_cookie_value(response: &axum::http::Response<axum::body::Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn signup_sets_session_cookie_and_signs_in() {
    let app = spawn_app().await;

    let response = app
        .post_form("/auth/signup/", "username=newcomer&password=longenough")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let cookie = set_cookie_value(&response);
    assert!(cookie.starts_with("pluma_session="));
    assert!(cookie.contains("HttpOnly"));

    let session = cookie.split(';').next().unwrap().to_string();
    let body = body_string(app.get_as("/", &session).await).await;
    assert!(body.contains("class=\"viewer\">newcomer"));
}

#[tokio::test]
async fn signup_rejects_short_password_and_taken_username() {
    let app = spawn_app().await;

    let short = app
        .post_form("/auth/signup/", "username=someone&password=short")
        .await;
    assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let first = app
        .post_form("/auth/signup/", "username=taken&password=longenough")
        .await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = app
        .post_form("/auth/signup/", "username=taken&password=alsolongenough")
        .await;
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_string(second).await;
    assert!(body.contains("already taken"));
}

#[tokio::test]
async fn login_follows_next_parameter_but_only_to_local_paths() {
    let app = spawn_app().await;
    app.post_form("/auth/signup/", "username=walker&password=longenough")
        .await;

    let local = app
        .post_form(
            "/auth/login/",
            "username=walker&password=longenough&next=%2Fcreate%2F",
        )
        .await;
    assert_eq!(local.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&local), "/create/");

    let external = app
        .post_form(
            "/auth/login/",
            "username=walker&password=longenough&next=https%3A%2F%2Fevil.example%2F",
        )
        .await;
    assert_eq!(location(&external), "/");
}

#[tokio::test]
async fn login_with_wrong_password_rerenders_form() {
    let app = spawn_app().await;
    app.post_form("/auth/signup/", "username=walker&password=longenough")
        .await;

    let response = app
        .post_form("/auth/login/", "username=walker&password=wrongpassword")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_string(response).await;
    assert!(body.contains("Invalid username or password."));
    assert!(body.contains("value=\"walker\""));
}

#[tokio::test]
async fn logout_clears_the_session() {
    let app = spawn_app().await;
    let user = app.seed_user("leaver").await;
    let cookie = app.session_cookie_for(user.id).await;

    let response = app.get_as("/auth/logout/", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // The old token no longer resolves; the chrome shows the anonymous links.
    let body = body_string(app.get_as("/", &cookie).await).await;
    assert!(!body.contains("class=\"viewer\""));
    assert!(body.contains("/auth/login/"));
}

#[tokio::test]
async fn follow_is_idempotent_and_self_follow_creates_no_edge() {
    let app = spawn_app().await;
    let reader = app.seed_user("reader").await;
    let author = app.seed_user("author").await;
    let cookie = app.session_cookie_for(reader.id).await;

    for _ in 0..2 {
        let response = app.get_as("/profile/author/follow/", &cookie).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/profile/author/");
    }
    assert!(
        app.repos
            .is_following(reader.id, author.id)
            .await
            .expect("check edge")
    );

    let selfie = app.get_as("/profile/reader/follow/", &cookie).await;
    assert_eq!(selfie.status(), StatusCode::SEE_OTHER);
    assert!(
        !app.repos
            .is_following(reader.id, reader.id)
            .await
            .expect("check self edge")
    );
}

#[tokio::test]
async fn unfollow_removes_edge_and_tolerates_absence() {
    let app = spawn_app().await;
    let reader = app.seed_user("reader").await;
    let author = app.seed_user("author").await;
    let cookie = app.session_cookie_for(reader.id).await;

    app.get_as("/profile/author/follow/", &cookie).await;
    app.get_as("/profile/author/unfollow/", &cookie).await;
    assert!(
        !app.repos
            .is_following(reader.id, author.id)
            .await
            .expect("check edge")
    );

    // Unfollowing again is a silent no-op.
    let again = app.get_as("/profile/author/unfollow/", &cookie).await;
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn follow_feed_shows_only_followed_authors() {
    let app = spawn_app().await;
    let reader = app.seed_user("reader").await;
    let followed = app.seed_user("followed").await;
    let ignored = app.seed_user("ignored").await;
    app.seed_post(followed.id, "from someone I follow").await;
    app.seed_post(ignored.id, "from a stranger").await;
    let cookie = app.session_cookie_for(reader.id).await;

    app.get_as("/profile/followed/follow/", &cookie).await;

    let body = body_string(app.get_as("/follow/", &cookie).await).await;
    assert!(body.contains("from someone I follow"));
    assert!(!body.contains("from a stranger"));
}

#[tokio::test]
async fn anonymous_follow_routes_redirect_to_login() {
    let app = spawn_app().await;
    app.seed_user("author").await;

    let feed = app.get("/follow/").await;
    assert_eq!(feed.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&feed), "/auth/login/?next=%2Ffollow%2F");

    let follow = app.get("/profile/author/follow/").await;
    assert_eq!(follow.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&follow),
        "/auth/login/?next=%2Fprofile%2Fauthor%2Ffollow%2F"
    );
}

#[tokio::test]
async fn anonymous_unfollow_redirects_back_to_the_unfollow_path() {
    let app = spawn_app().await;
    app.seed_user("author").await;

    let response = app.get("/profile/author/unfollow/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/auth/login/?next=%2Fprofile%2Fauthor%2Funfollow%2F"
    );
}

#[tokio::test]
async fn profile_offers_follow_controls_to_other_signed_in_users_only() {
    let app = spawn_app().await;
    let reader = app.seed_user("reader").await;
    app.seed_user("author").await;
    let cookie = app.session_cookie_for(reader.id).await;

    let anonymous = body_string(app.get("/profile/author/").await).await;
    assert_eq!(count_occurrences(&anonymous, "class=\"follow\""), 0);

    let signed_in = body_string(app.get_as("/profile/author/", &cookie).await).await;
    assert_eq!(count_occurrences(&signed_in, "class=\"follow\""), 1);

    let own_profile = body_string(app.get_as("/profile/reader/", &cookie).await).await;
    assert_eq!(count_occurrences(&own_profile, "class=\"follow\""), 0);

    app.get_as("/profile/author/follow/", &cookie).await;
    let after_follow = body_string(app.get_as("/profile/author/", &cookie).await).await;
    assert_eq!(count_occurrences(&after_follow, "class=\"follow\""), 0);
    assert_eq!(count_occurrences(&after_follow, "class=\"unfollow\""), 1);
}
