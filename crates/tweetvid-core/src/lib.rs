//! Twitter/X Video Extractor Core Library
//!
//! Provides async API for resolving a tweet URL to the downloadable MP4
//! renditions of its video.
//!
//! # Overview
//!
//! This crate provides the complete extraction pipeline:
//! - URL parsing for twitter.com / x.com status links and bare IDs
//! - Guest token activation and reuse for anonymous API access
//! - An authenticated fetcher for the GraphQL tweet endpoint
//! - A payload parser producing quality-labelled, bitrate-sorted variants
//! - An in-memory TTL cache with in-flight request de-duplication
//!
//! # Example
//!
//! ```no_run
//! use tweetvid_core::{Result, TweetScraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let scraper = TweetScraper::new()?;
//!
//!     let video = scraper
//!         .download_video("https://x.com/alice/status/1234567890123456789")
//!         .await?;
//!
//!     for variant in &video.variants {
//!         println!("{} ({} bps): {}", variant.quality, variant.bitrate, variant.url);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Upstream contract
//!
//! The GraphQL endpoint, operation id and feature flags belong to an
//! unofficial API that changes without notice. They are confined to
//! [`TweetFetcher`]; extraction and caching do not depend on them.
//!
//! **Important:** variant URLs point at the video CDN and are returned as-is.
//! This crate never downloads or proxies video bytes.

mod cache;
mod client;
mod error;
pub mod parser;
mod quality;
mod scraper;
mod token;
mod types;
pub mod url;

// Re-export cache types
pub use cache::{DEFAULT_CACHE_TTL, DEFAULT_REAP_INTERVAL, ResultCache};

// Re-export client types
pub use client::{ClientConfig, TweetFetcher};

// Re-export error types
pub use error::{Result, TweetVidError};

// Re-export parser functions
pub use parser::{extract_video, truncate_caption};

// Re-export quality helpers
pub use quality::{label_for_bitrate, sort_by_bitrate_desc};

// Re-export main scraper API
pub use scraper::TweetScraper;

// Re-export token types
pub use token::{GUEST_TOKEN_LIFETIME, GuestToken, GuestTokenManager};

// Re-export data types
pub use types::{CacheStats, ExtractionResult, VideoVariant};

// Re-export URL helper functions for convenience
pub use url::{is_valid_tweet_url, parse_tweet_id};
