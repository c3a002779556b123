//! HTTP handlers for the download API
//!
//! This module contains all route handler implementations.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use tweetvid_core::{CacheStats, ExtractionResult};

use crate::AppState;
use crate::error::ApiError;

/// Response envelope shared by every API route
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Stable machine-readable error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// User-facing message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn failure(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(code.to_string()),
            message: Some(message.to_string()),
        }
    }
}

/// Body of `POST /api/download`
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: Option<String>,
}

/// Resolve a tweet URL to its downloadable video variants
///
/// # Errors
/// - `MissingUrl` if the body has no non-empty `url`
/// - `InvalidBody` if the body is not JSON
/// - any extraction error, mapped through [`crate::error::classify`]
pub async fn download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Arc<ExtractionResult>>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;

    let url = request
        .url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingUrl)?;

    info!(%url, "Download requested");
    let video = state.scraper.download_video(&url).await?;

    Ok(Json(ApiResponse::success(video)))
}

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Service descriptor
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "Twitter/X Video Downloader API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "download": "POST /api/download",
            "health": "GET /api/health",
            "cacheStats": "GET /api/cache/stats",
            "cacheFlush": "DELETE /api/cache",
        },
    }))
}

/// Result cache counters
pub async fn cache_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::success(state.scraper.cache().stats()))
}

/// Drop every cached extraction result
pub async fn flush_cache(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    state.scraper.cache().flush();
    info!("Result cache flushed");

    Json(ApiResponse {
        success: true,
        data: None,
        error: None,
        message: Some("Cache cleared".to_string()),
    })
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
