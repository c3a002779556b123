//! HTTP API for the tweetvid extractor
//!
//! Exposes [`tweetvid_core::TweetScraper`] over a small JSON API.
//!
//! # Routes
//!
//! | Method | Path               | Purpose                                |
//! |--------|--------------------|----------------------------------------|
//! | GET    | `/`                | Service descriptor                     |
//! | POST   | `/api/download`    | Resolve a tweet URL to video variants  |
//! | GET    | `/api/health`      | Liveness probe                         |
//! | GET    | `/api/cache/stats` | Result cache counters                  |
//! | DELETE | `/api/cache`       | Flush the result cache                 |
//!
//! # Usage
//!
//! ```no_run
//! # async fn example() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use tweetvid_core::TweetScraper;
//! use tweetvid_server::{build_router, config::ServerConfig};
//!
//! let config = ServerConfig::default();
//! let scraper = Arc::new(TweetScraper::with_config(config.client_config())?);
//! let app = build_router(scraper, &config)?;
//!
//! let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tweetvid_core::TweetScraper;

pub mod api;
pub mod config;
pub mod error;
pub mod rate_limit;

use config::ServerConfig;
use rate_limit::ClientRateLimiter;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<TweetScraper>,
}

/// Build the application router
///
/// Every `/api` route counts against the general per-client limit;
/// `/api/download` additionally counts against the download limit.
///
/// # Errors
/// Returns error if the configured CORS origin is not a valid header value
pub fn build_router(scraper: Arc<TweetScraper>, config: &ServerConfig) -> anyhow::Result<Router> {
    let api_limiter = Arc::new(ClientRateLimiter::per_minute(config.api_rate_limit));
    let download_limiter = Arc::new(ClientRateLimiter::per_minute(config.download_rate_limit));

    let download = Router::new()
        .route("/download", post(api::download))
        .route_layer(middleware::from_fn_with_state(
            download_limiter,
            rate_limit::enforce,
        ));

    let api_routes = Router::new()
        .route("/health", get(api::health))
        .route("/cache/stats", get(api::cache_stats))
        .route("/cache", delete(api::flush_cache))
        .merge(download)
        .route_layer(middleware::from_fn_with_state(api_limiter, rate_limit::enforce));

    let app = Router::new()
        .route("/", get(api::index))
        .nest("/api", api_routes)
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.cors_origin.as_deref())?)
        .with_state(AppState { scraper });

    Ok(app)
}

fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let layer = match origin.map(str::trim) {
        None | Some("") | Some("*") => layer.allow_origin(Any),
        Some(origin) => layer.allow_origin(
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {origin}"))?,
        ),
    };
    Ok(layer)
}
