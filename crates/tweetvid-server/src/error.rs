//! Mapping from extraction errors to HTTP responses
//!
//! All status codes and user-facing messages come from [`classify`], the
//! single lookup table for error kinds.

use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};
use tweetvid_core::TweetVidError;

use crate::api::ApiResponse;

pub const INVALID_URL_MESSAGE: &str = "❌ Please enter a valid Twitter/X post URL";
pub const RATE_LIMITED_MESSAGE: &str =
    "⏳ Too many requests. Please wait 30 seconds and try again.";

/// Status, stable error code and user-facing message for an error kind
pub fn classify(err: &TweetVidError) -> (StatusCode, &'static str, &'static str) {
    match err {
        TweetVidError::InvalidUrl(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_URL", INVALID_URL_MESSAGE)
        }
        TweetVidError::NotFoundOrPrivate(_) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND_OR_PRIVATE",
            "🔒 This post is private, protected, or does not exist",
        ),
        TweetVidError::NoVideoPresent => (
            StatusCode::NOT_FOUND,
            "NO_VIDEO",
            "❌ No video found in this post",
        ),
        TweetVidError::NoPlayableFormat => (
            StatusCode::NOT_FOUND,
            "NO_PLAYABLE_FORMAT",
            "❌ No downloadable video formats found in this post",
        ),
        TweetVidError::UpstreamRateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "UPSTREAM_RATE_LIMITED",
            "⏳ Too many requests. Please wait 30 seconds",
        ),
        TweetVidError::AuthenticationFailure(_)
        | TweetVidError::FetchFailed(_)
        | TweetVidError::MalformedPayload(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "UPSTREAM_ERROR",
            "⚠️ Could not retrieve this post right now. Please try again later.",
        ),
        TweetVidError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Something went wrong. Please try again later.",
        ),
    }
}

/// Error returned by API handlers and middleware
#[derive(Debug)]
pub enum ApiError {
    /// The extraction pipeline failed
    Extraction(TweetVidError),
    /// Request body has no (or an empty) `url`
    MissingUrl,
    /// Request body is not valid JSON for the endpoint
    InvalidBody(String),
    /// A local per-client rate limit was exceeded
    TooManyRequests { retry_after: Duration },
    /// No route matched
    RouteNotFound,
}

impl From<TweetVidError> for ApiError {
    fn from(err: TweetVidError) -> Self {
        Self::Extraction(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Extraction(err) => {
                let (status, code, message) = classify(&err);
                if status.is_server_error() {
                    error!(error = %err, code, "Download failed");
                } else {
                    warn!(error = %err, code, "Download rejected");
                }
                failure(status, code, message)
            }
            ApiError::MissingUrl => {
                failure(StatusCode::BAD_REQUEST, "URL_REQUIRED", "URL is required")
            }
            ApiError::InvalidBody(reason) => {
                warn!(%reason, "Rejected malformed request body");
                failure(StatusCode::BAD_REQUEST, "INVALID_BODY", INVALID_URL_MESSAGE)
            }
            ApiError::TooManyRequests { retry_after } => {
                let mut response = failure(
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    RATE_LIMITED_MESSAGE,
                );
                let secs = retry_after.as_millis().div_ceil(1000).max(1);
                if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
            ApiError::RouteNotFound => failure(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "The requested endpoint does not exist",
            ),
        }
    }
}

fn failure(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(ApiResponse::<()>::failure(code, message))).into_response()
}
