//! # Middleware Module
//!
//! Global rate limiting for the HTTP API.
//!
//! `VERISIFT_RATE_LIMIT` sets requests per second (default: 20, 0 disables).
//! Every analysis may fan out to several paid upstream APIs, so the default
//! is low.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::types::ErrorResponse;

/// Requests per second when `VERISIFT_RATE_LIMIT` is unset or invalid.
pub const DEFAULT_RATE_LIMIT: u32 = 20;

pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build a limiter allowing `requests_per_second`, or `None` when zero.
pub fn create_rate_limiter(requests_per_second: u32) -> Option<GlobalRateLimiter> {
    let rps = NonZeroU32::new(requests_per_second)?;
    Some(Arc::new(RateLimiter::direct(Quota::per_second(rps))))
}

/// Parse a `VERISIFT_RATE_LIMIT` value.
pub fn parse_rate_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT)
}

pub fn get_rate_limit_from_env() -> u32 {
    parse_rate_limit(std::env::var("VERISIFT_RATE_LIMIT").ok().as_deref())
}

/// Reject with 429 once the global budget is spent.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_err() {
        tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Too Many Requests".to_string(),
            }),
        )
            .into_response();
    }
    next.run(request).await
}
