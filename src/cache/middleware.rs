//! Response cache middleware for the public listings.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::infra::http::auth::SESSION_COOKIE;

use super::{
    CacheConfig,
    keys::{ListingKey, ResponseKey},
    store::{CachedResponse, ResponseStore},
};

/// Bodies larger than this are served but never cached.
const CACHE_BODY_LIMIT: usize = 1024 * 1024;

/// Shared cache state for middleware and the invalidating write paths.
#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<ResponseStore>,
}

impl CacheState {
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(ResponseStore::new(&config));
        Self { config, store }
    }
}

/// Serve GET requests for the index and group listings from the cache.
///
/// Requests carrying a session cookie bypass the cache entirely; the page
/// chrome differs for signed-in viewers.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enabled || request.method() != Method::GET {
        return next.run(request).await;
    }

    let Some(listing) = ListingKey::from_path(request.uri().path()) else {
        return next.run(request).await;
    };

    if has_session_cookie(&request) {
        return next.run(request).await;
    }

    let query = request.uri().query().unwrap_or("");
    let key = ResponseKey::new(listing, query);

    if let Some(cached) = cache.store.get(&key) {
        debug!(outcome = "hit", "serving cached listing");
        return build_response(cached);
    }
    debug!(outcome = "miss", "rendering listing");

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    if bytes.len() <= CACHE_BODY_LIMIT {
        cache.store.set(
            key,
            CachedResponse {
                status: parts.status.as_u16(),
                headers: parts
                    .headers
                    .iter()
                    .filter_map(|(name, value)| {
                        value
                            .to_str()
                            .ok()
                            .map(|v| (name.to_string(), v.to_string()))
                    })
                    .collect(),
                body: bytes.clone(),
            },
        );
    } else {
        debug!(outcome = "oversized", "listing body exceeds the cache limit");
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn has_session_cookie(request: &Request<Body>) -> bool {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|cookies| {
            cookies
                .split(';')
                .any(|pair| pair.trim_start().starts_with(SESSION_COOKIE))
        })
}

fn build_response(cached: CachedResponse) -> Response {
    use axum::http::HeaderValue;

    let mut builder = Response::builder().status(cached.status);
    for (name, value) in cached.headers {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, header_value);
        }
    }
    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
