mod accounts;
pub mod auth;
mod forms;
mod middleware;
mod public;

pub use public::{HttpState, build_router};

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// A generic 500 with the full error chain attached for the response logger.
fn internal_error_response(source: &'static str, err: &dyn StdError) -> Response {
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong. Please try again later.",
    )
        .into_response();
    ErrorReport::from_error(source, StatusCode::INTERNAL_SERVER_ERROR, err).attach(&mut response);
    response
}
