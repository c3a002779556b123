//! Main download API for Twitter/X videos
//!
//! Combines URL parsing, the result cache, the authenticated fetcher and
//! the video extractor behind one call.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::ResultCache;
use crate::client::{ClientConfig, TweetFetcher};
use crate::error::{Result, TweetVidError};
use crate::parser::extract_video;
use crate::types::ExtractionResult;
use crate::url::parse_tweet_id;

type SharedExtraction = Shared<BoxFuture<'static, Result<Arc<ExtractionResult>>>>;
type InFlightMap = Arc<Mutex<HashMap<String, SharedExtraction>>>;

/// Removes a tweet's in-flight entry when the extraction task ends,
/// whether it returns or panics
struct InFlightGuard {
    registry: InFlightMap,
    tweet_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.tweet_id);
    }
}

/// Main download API for Twitter/X videos
///
/// The fetcher (with its guest token) and the cache are injected, so one
/// process can share them and tests can isolate them. Concurrent requests
/// for the same tweet share a single upstream fetch.
pub struct TweetScraper {
    fetcher: Arc<TweetFetcher>,
    cache: Arc<ResultCache>,
    in_flight: InFlightMap,
}

impl TweetScraper {
    /// Create a new scraper with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new scraper with custom client configuration and a
    /// default cache
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let fetcher = TweetFetcher::with_config(config)?;
        Ok(Self::from_parts(
            Arc::new(fetcher),
            Arc::new(ResultCache::new()),
        ))
    }

    /// Create a scraper from an existing fetcher and cache
    pub fn from_parts(fetcher: Arc<TweetFetcher>, cache: Arc<ResultCache>) -> Self {
        Self {
            fetcher,
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Resolve a tweet URL to its downloadable video variants
    ///
    /// # Arguments
    /// * `url` - Tweet URL or bare tweet ID
    ///
    /// # Returns
    /// The extraction result, from cache when a fresh entry exists
    ///
    /// # Errors
    /// - `InvalidUrl` if no tweet ID can be parsed from `url`
    /// - any fetch or extraction error; failures are never cached
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> tweetvid_core::Result<()> {
    /// use tweetvid_core::TweetScraper;
    /// let scraper = TweetScraper::new()?;
    /// let video = scraper
    ///     .download_video("https://x.com/alice/status/1234567890123456789")
    ///     .await?;
    /// println!("{}: {}", video.best_quality.quality, video.best_quality.url);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download_video(&self, url: &str) -> Result<Arc<ExtractionResult>> {
        let tweet_id =
            parse_tweet_id(url).ok_or_else(|| TweetVidError::InvalidUrl(url.to_string()))?;

        if let Some(cached) = self.cache.get(&tweet_id) {
            debug!(tweet_id, "Cache hit");
            return Ok(cached);
        }

        self.extraction_for(tweet_id).await
    }

    /// Join the in-flight extraction for `tweet_id`, or start one
    ///
    /// The work runs on its own task so it completes and fills the cache
    /// even if every caller stops waiting.
    fn extraction_for(&self, tweet_id: String) -> SharedExtraction {
        let mut in_flight = self.in_flight.lock();
        if let Some(existing) = in_flight.get(&tweet_id) {
            debug!(tweet_id, "Joining in-flight extraction");
            return existing.clone();
        }

        let fetcher = Arc::clone(&self.fetcher);
        let cache = Arc::clone(&self.cache);
        let guard = InFlightGuard {
            registry: Arc::clone(&self.in_flight),
            tweet_id: tweet_id.clone(),
        };

        let task = tokio::spawn(async move {
            let id = guard.tweet_id.as_str();
            let outcome = fetch_and_extract(&fetcher, id).await.map(Arc::new);
            if let Ok(result) = &outcome {
                info!(tweet_id = %id, variants = result.variants.len(), "Extracted tweet video");
                cache.put(id, Arc::clone(result));
            }
            drop(guard);
            outcome
        });

        let shared = async move {
            task.await.unwrap_or_else(|e| {
                Err(TweetVidError::Internal(format!(
                    "extraction task failed: {}",
                    e
                )))
            })
        }
        .boxed()
        .shared();

        in_flight.insert(tweet_id, shared.clone());
        shared
    }
}

async fn fetch_and_extract(fetcher: &TweetFetcher, tweet_id: &str) -> Result<ExtractionResult> {
    let raw = fetcher.fetch_raw_post(tweet_id).await?;
    extract_video(&raw, tweet_id)
}
