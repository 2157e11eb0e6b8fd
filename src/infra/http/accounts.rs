//! Signup, login and logout handlers.

use std::collections::HashMap;

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::application::auth::AuthError;
use crate::presentation::views::{
    LayoutContext, LoginContext, LoginTemplate, SignupContext, SignupTemplate,
    render_template_response,
};

use super::auth::{SESSION_COOKIE, current_user, removal_cookie, safe_next, session_cookie};
use super::forms::{LoginForm, SignupForm};
use super::internal_error_response;
use super::public::HttpState;

pub async fn signup_form(State(state): State<HttpState>, jar: CookieJar) -> Response {
    if current_user(&state, &jar).await.is_some() {
        return Redirect::to("/").into_response();
    }
    render_signup(String::new(), Vec::new(), StatusCode::OK)
}

pub async fn signup(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Response {
    match state.auth.signup(&form.username, &form.password).await {
        Ok(signed_in) => {
            let jar = jar.add(session_cookie(signed_in.token));
            (jar, Redirect::to("/")).into_response()
        }
        Err(AuthError::Validation(message)) => render_signup(
            form.username,
            vec![message],
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(AuthError::UsernameTaken) => render_signup(
            form.username,
            vec!["That username is already taken.".to_string()],
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(err) => internal_error_response("infra::http::accounts::signup", &err),
    }
}

pub async fn login_form(
    State(state): State<HttpState>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if current_user(&state, &jar).await.is_some() {
        return Redirect::to("/").into_response();
    }
    let next = params.get("next").cloned().unwrap_or_default();
    render_login(String::new(), next, Vec::new(), StatusCode::OK)
}

pub async fn login(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.login(&form.username, &form.password).await {
        Ok(signed_in) => {
            let jar = jar.add(session_cookie(signed_in.token));
            (jar, Redirect::to(safe_next(&form.next))).into_response()
        }
        Err(AuthError::InvalidCredentials) | Err(AuthError::Validation(_)) => render_login(
            form.username,
            form.next,
            vec!["Invalid username or password.".to_string()],
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(err) => internal_error_response("infra::http::accounts::login", &err),
    }
}

pub async fn logout(State(state): State<HttpState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let token = cookie.value().to_string();
        if let Err(err) = state.auth.logout(&token).await {
            return internal_error_response("infra::http::accounts::logout", &err);
        }
    }
    let jar = jar.remove(removal_cookie());
    (jar, Redirect::to("/")).into_response()
}

fn render_signup(username: String, errors: Vec<String>, status: StatusCode) -> Response {
    let content = SignupContext { username, errors };
    let view = LayoutContext::new(None, content);
    render_template_response(SignupTemplate { view }, status)
}

fn render_login(username: String, next: String, errors: Vec<String>, status: StatusCode) -> Response {
    let content = LoginContext {
        username,
        next,
        errors,
    };
    let view = LayoutContext::new(None, content);
    render_template_response(LoginTemplate { view }, status)
}
