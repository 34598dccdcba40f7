//! # Authentication Module
//!
//! Optional bearer API key. When `VERISIFT_API_KEY` is set, every route
//! except `/health` requires:
//!
//! ```text
//! Authorization: Bearer <your-api-key>
//! ```

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use super::types::ErrorResponse;

/// The configured API key. Never logged.
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    /// `None` for a blank key.
    pub fn new(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            None
        } else {
            Some(Self(Arc::from(key)))
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var("VERISIFT_API_KEY")
            .ok()
            .and_then(|k| Self::new(&k))
    }

    /// Compare in constant time over the longer of the two lengths.
    pub fn matches(&self, provided: &str) -> bool {
        let expected = self.0.as_bytes();
        let provided = provided.as_bytes();

        let len = expected.len().max(provided.len());
        let mut a = vec![0u8; len];
        let mut b = vec![0u8; len];
        a[..expected.len()].copy_from_slice(expected);
        b[..provided.len()].copy_from_slice(provided);

        let same_bytes: bool = a.ct_eq(&b).into();
        same_bytes && expected.len() == provided.len()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}

/// Require the bearer key on every route but `/health`.
pub async fn api_key_auth_middleware(
    State(key): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

    match provided {
        Some(token) if key.matches(token) => next.run(request).await,
        Some(_) => {
            tracing::warn!(event = "auth_failure", reason = "invalid_api_key", "Invalid API key");
            unauthorized()
        }
        None => {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                "Missing Authorization header"
            );
            unauthorized()
        }
    }
}
