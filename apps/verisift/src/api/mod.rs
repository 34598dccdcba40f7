//! # Verisift HTTP API Module
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api/v1/analysis` - Analyse text
//! - `POST /api/v1/analyze-url` - Analyse the text of an article URL
//! - `POST /api/v1/analyze-image` - Analyse the text of an uploaded image (multipart `file`)
//! - `POST /api/v1/analyze-voice` - Analyse the transcript of an uploaded recording (multipart `file`)
//! - `POST /api/v1/verify-claim-pdf` - Look for a claim in official documents
//! - `GET /api/v1/catalog` - List the official documents
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `VERISIFT_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: local dev servers)
//! - `VERISIFT_RATE_LIMIT`: Requests per second (default: 20, 0 to disable)
//! - `VERISIFT_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::ApiKey;
pub use handlers::{
    analysis_handler, analyze_image_handler, analyze_url_handler, analyze_voice_handler,
    catalog_handler, health_handler, verify_claim_handler,
};
pub use middleware::{DEFAULT_RATE_LIMIT, create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    ApiError, CatalogDocument, CatalogResponse, ErrorResponse, HealthResponse, TextIn, UrlIn,
    VerificationQueryIn,
};

use crate::engine::Engine;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use verisift_core::VerisiftError;
use verisift_core::primitives::MAX_UPLOAD_BYTES;

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Body limit of the upload routes: one file plus the multipart framing.
const MAX_UPLOAD_BODY_BYTES: usize = MAX_UPLOAD_BYTES + 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Security knobs of the router. `Default` disables rate limiting and auth
/// and allows the local dev origins.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub cors_origins: Option<String>,
    pub rate_limit: u32,
    pub api_key: Option<ApiKey>,
}

impl ServerOptions {
    pub fn from_env() -> Self {
        Self {
            cors_origins: std::env::var("VERISIFT_CORS_ORIGINS").ok(),
            rate_limit: get_rate_limit_from_env(),
            api_key: ApiKey::from_env(),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// `"*"` allows every origin; otherwise a comma-separated list; otherwise
/// the local frontend dev servers.
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins.map(str::trim) {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (VERISIFT_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(list) if !list.is_empty() => {
            let allowed: Vec<HeaderValue> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => Some(hv),
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins configured, using local dev origins");
                dev_cors()
            } else {
                tracing::info!("CORS: Allowing {} configured origin(s)", allowed.len());
                cors_for(allowed)
            }
        }
        _ => dev_cors(),
    }
}

/// Local frontend dev servers (React, Vite, Angular).
fn dev_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:4200",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:4200",
    ]
    .into_iter()
    .filter_map(|o| o.parse().ok())
    .collect();
    cors_for(origins)
}

fn cors_for(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit, rate
/// limiting (if enabled), authentication (if a key is set).
pub fn create_router(state: AppState, options: &ServerOptions) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/v1/analysis", post(handlers::analysis_handler))
        .route("/api/v1/analyze-url", post(handlers::analyze_url_handler))
        .route(
            "/api/v1/analyze-image",
            post(handlers::analyze_image_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route(
            "/api/v1/analyze-voice",
            post(handlers::analyze_voice_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/api/v1/verify-claim-pdf", post(handlers::verify_claim_handler))
        .route("/api/v1/catalog", get(handlers::catalog_handler));

    match &options.api_key {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            router = router.layer(axum_middleware::from_fn_with_state(
                key.clone(),
                auth::api_key_auth_middleware,
            ));
        }
        None => tracing::warn!(
            "API key authentication DISABLED - set VERISIFT_API_KEY to enable it"
        ),
    }

    match create_rate_limiter(options.rate_limit) {
        Some(limiter) => {
            tracing::info!("Rate limiting enabled: {} requests/second", options.rate_limit);
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(build_cors_layer(options.cors_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve until Ctrl+C.
pub async fn run_server(addr: &str, engine: Engine) -> Result<(), VerisiftError> {
    let router = create_router(AppState::new(engine), &ServerOptions::from_env());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| VerisiftError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Verisift HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Cannot listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
        })
        .await
        .map_err(|e| VerisiftError::IoError(format!("Server error: {}", e)))
}
