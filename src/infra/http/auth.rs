//! Session cookie plumbing for the HTTP surface.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use crate::domain::entities::UserRecord;

use super::public::HttpState;

pub const SESSION_COOKIE: &str = "pluma_session";

/// Resolve the request's session cookie to a user, if any. Resolution
/// failures degrade to an anonymous view rather than an error page.
pub async fn current_user(state: &HttpState, jar: &CookieJar) -> Option<UserRecord> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();
    match state.auth.resolve(&token).await {
        Ok(user) => user,
        Err(err) => {
            warn!(
                target = "pluma::http::auth",
                error = %err,
                "failed to resolve session token"
            );
            None
        }
    }
}

/// Redirect an unauthenticated request to the login page, preserving the
/// original path in the `next` parameter.
pub fn login_redirect(next: &str) -> Response {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    Redirect::to(&format!("/auth/login/?next={encoded}")).into_response()
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

/// Accept a `next` target only when it is a local path; anything else falls
/// back to the front page.
pub fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") {
        next
    } else {
        "/"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_targets_are_restricted_to_local_paths() {
        assert_eq!(safe_next("/create/"), "/create/");
        assert_eq!(safe_next("https://example.com/"), "/");
        assert_eq!(safe_next("//example.com/"), "/");
        assert_eq!(safe_next(""), "/");
    }
}
