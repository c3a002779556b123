//! Core data types for the tweetvid extractor
//!
//! Field names serialize in camelCase to keep the JSON shape clients of the
//! download API already consume.

use serde::{Deserialize, Serialize};

/// One MP4 rendition of a tweet video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoVariant {
    /// Quality label derived from the bitrate (e.g., "720p")
    pub quality: String,

    /// Bitrate in bits per second (0 when upstream omits it)
    pub bitrate: u64,

    /// Direct playback/download URL on the video CDN
    pub url: String,
}

/// Normalized result of extracting the video from one tweet
///
/// `variants` is never empty and `best_quality` is always `variants[0]`;
/// build it through [`ExtractionResult::new`] to keep that true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Tweet identifier the result was extracted for
    pub tweet_id: String,

    /// Author screen name, "unknown" when upstream omits it
    pub username: String,

    /// Tweet text, truncated to 100 characters plus "..."
    pub text: String,

    /// Poster image of the video
    pub thumbnail: String,

    /// MP4 variants, highest bitrate first
    pub variants: Vec<VideoVariant>,

    /// Highest bitrate variant
    pub best_quality: VideoVariant,
}

impl ExtractionResult {
    /// Builds a result from already sorted variants
    ///
    /// Returns `None` when `variants` is empty.
    pub fn new(
        tweet_id: String,
        username: String,
        text: String,
        thumbnail: String,
        variants: Vec<VideoVariant>,
    ) -> Option<Self> {
        let best_quality = variants.first()?.clone();
        Some(Self {
            tweet_id,
            username,
            text,
            thumbnail,
            variants,
            best_quality,
        })
    }
}

/// Snapshot of result cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries currently stored (expired but unreaped entries included)
    pub entry_count: usize,
    /// Lookups answered from the cache
    pub hit_count: u64,
    /// Lookups that found nothing or an expired entry
    pub miss_count: u64,
}
