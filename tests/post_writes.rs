//! Creating, editing and commenting on posts through the HTTP surface.

mod support;

use axum::http::StatusCode;

use pluma::application::repos::{CommentsRepo, PostsRepo};
use support::{body_string, location, spawn_app};

#[tokio::test]
async fn anonymous_create_redirects_to_login_with_next() {
    let app = spawn_app().await;

    let get = app.get("/create/").await;
    assert_eq!(get.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&get), "/auth/login/?next=%2Fcreate%2F");

    let post = app.post_form("/create/", "text=hello").await;
    assert_eq!(post.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&post), "/auth/login/?next=%2Fcreate%2F");
}

#[tokio::test]
async fn create_persists_post_and_redirects_to_profile() {
    let app = spawn_app().await;
    let user = app.seed_user("sasha").await;
    let cookie = app.session_cookie_for(user.id).await;

    let response = app
        .post_form_as("/create/", &cookie, "text=my+first+post")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/sasha/");

    let body = body_string(app.get("/profile/sasha/").await).await;
    assert!(body.contains("my first post"));
}

#[tokio::test]
async fn create_with_blank_text_rerenders_form() {
    let app = spawn_app().await;
    let user = app.seed_user("sasha").await;
    let cookie = app.session_cookie_for(user.id).await;

    let response = app
        .post_form_as("/create/", &cookie, "text=+++&title=Kept+title")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_string(response).await;
    assert!(body.contains("class=\"form-error\""));
    assert!(body.contains("Kept title"), "submitted values are echoed back");
}

#[tokio::test]
async fn create_with_overlong_title_rerenders_form() {
    let app = spawn_app().await;
    let user = app.seed_user("sasha").await;
    let cookie = app.session_cookie_for(user.id).await;

    let long_title = "x".repeat(41);
    let response = app
        .post_form_as("/create/", &cookie, &format!("text=ok&title={long_title}"))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn edit_updates_text_but_never_pub_date() {
    let app = spawn_app().await;
    let user = app.seed_user("sasha").await;
    let cookie = app.session_cookie_for(user.id).await;
    let post = app.seed_post(user.id, "original text").await;

    let response = app
        .post_form_as(
            &format!("/posts/{}/edit/", post.id),
            &cookie,
            "text=revised+text",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));

    let stored = app
        .repos
        .find_by_id(post.id)
        .await
        .expect("load post")
        .expect("post exists");
    assert_eq!(stored.post.text, "revised text");
    assert_eq!(stored.post.pub_date, post.pub_date);
    assert_eq!(stored.post.author_id, user.id);
}

#[tokio::test]
async fn non_author_edit_redirects_and_leaves_post_unchanged() {
    let app = spawn_app().await;
    let author = app.seed_user("author").await;
    let intruder = app.seed_user("intruder").await;
    let cookie = app.session_cookie_for(intruder.id).await;
    let post = app.seed_post(author.id, "untouchable").await;

    let get = app
        .get_as(&format!("/posts/{}/edit/", post.id), &cookie)
        .await;
    assert_eq!(get.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&get), format!("/posts/{}/", post.id));

    let response = app
        .post_form_as(
            &format!("/posts/{}/edit/", post.id),
            &cookie,
            "text=defaced",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));

    let stored = app
        .repos
        .find_by_id(post.id)
        .await
        .expect("load post")
        .expect("post exists");
    assert_eq!(stored.post.text, "untouchable");
}

#[tokio::test]
async fn edit_of_missing_post_renders_not_found() {
    let app = spawn_app().await;
    let user = app.seed_user("sasha").await;
    let cookie = app.session_cookie_for(user.id).await;

    let response = app.get_as("/posts/999/edit/", &cookie).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_is_stored_and_rendered() {
    let app = spawn_app().await;
    let author = app.seed_user("author").await;
    let reader = app.seed_user("reader").await;
    let cookie = app.session_cookie_for(reader.id).await;
    let post = app.seed_post(author.id, "discuss me").await;

    let response = app
        .post_form_as(
            &format!("/posts/{}/comment/", post.id),
            &cookie,
            "text=well+said",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));

    let body = body_string(app.get(&format!("/posts/{}/", post.id)).await).await;
    assert!(body.contains("well said"));
    assert!(body.contains("class=\"comment-author\">reader"));
}

#[tokio::test]
async fn blank_comment_redirects_without_storing() {
    let app = spawn_app().await;
    let author = app.seed_user("author").await;
    let reader = app.seed_user("reader").await;
    let cookie = app.session_cookie_for(reader.id).await;
    let post = app.seed_post(author.id, "quiet post").await;

    let response = app
        .post_form_as(&format!("/posts/{}/comment/", post.id), &cookie, "text=++")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/posts/{}/", post.id));

    let count = app
        .repos
        .count_for_post(post.id)
        .await
        .expect("count comments");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn anonymous_comment_redirects_to_login() {
    let app = spawn_app().await;
    let author = app.seed_user("author").await;
    let post = app.seed_post(author.id, "no drive-by comments").await;

    let response = app
        .post_form(&format!("/posts/{}/comment/", post.id), "text=anon")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/auth/login/?next="));
}

#[tokio::test]
async fn comment_on_missing_post_renders_not_found() {
    let app = spawn_app().await;
    let reader = app.seed_user("reader").await;
    let cookie = app.session_cookie_for(reader.id).await;

    let response = app
        .post_form_as("/posts/777/comment/", &cookie, "text=void")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
