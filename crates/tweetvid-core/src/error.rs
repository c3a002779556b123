//! Error types for the tweetvid extractor
//!
//! Every failure in the pipeline surfaces as exactly one of these kinds,
//! so the request boundary can map them to responses without inspecting
//! message text.

use thiserror::Error;

/// Error type for all tweetvid operations
///
/// The enum is `Clone` so a single in-flight extraction can hand the same
/// outcome to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TweetVidError {
    /// No tweet identifier could be found in the input
    #[error("Invalid Twitter/X URL: {0}")]
    InvalidUrl(String),

    /// Guest token activation failed
    #[error("Failed to authenticate with Twitter: {0}")]
    AuthenticationFailure(String),

    /// Upstream answered 404
    #[error("Tweet not found or is private: {0}")]
    NotFoundOrPrivate(String),

    /// Upstream answered 429
    #[error("Rate limit exceeded by Twitter")]
    UpstreamRateLimited,

    /// Any other non-2xx status or transport error
    #[error("Failed to fetch tweet data: {0}")]
    FetchFailed(String),

    /// Response did not have the expected result/legacy structure
    #[error("Malformed tweet data: {0}")]
    MalformedPayload(String),

    /// Tweet has no video or animated GIF media
    #[error("No video found in this tweet")]
    NoVideoPresent,

    /// Video media exists but carries no MP4 variant
    #[error("No downloadable video formats found")]
    NoPlayableFormat,

    /// Unclassified failure (client construction, background task failure)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for tweetvid operations
pub type Result<T> = std::result::Result<T, TweetVidError>;
