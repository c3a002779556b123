//! HTTP client for the Twitter/X GraphQL API
//!
//! Everything that depends on the unofficial upstream contract (paths,
//! operation id, feature flags, application credential) lives here so it
//! can change without touching extraction or caching.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, REFERER};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, TweetVidError};
use crate::token::{GUEST_TOKEN_LIFETIME, GuestTokenManager};

/// Configuration for the upstream HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
    /// Base URL of the REST API hosting guest activation (default: https://api.twitter.com)
    pub api_base_url: String,
    /// Base URL of the web GraphQL API (default: https://twitter.com)
    pub web_base_url: String,
    /// Seconds a guest token is reused before refreshing (default: 7200)
    pub token_lifetime_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            api_base_url: "https://api.twitter.com".to_string(),
            web_base_url: "https://twitter.com".to_string(),
            token_lifetime_secs: GUEST_TOKEN_LIFETIME.as_secs(),
        }
    }
}

/// Public bearer credential embedded in the official web client
const BEARER_TOKEN: &str =
    "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const GUEST_ACTIVATE_PATH: &str = "/1.1/guest/activate.json";
const TWEET_RESULT_PATH: &str = "/i/api/graphql/VaenaVgh5q5ih7kvyVjgtg/TweetResultByRestId";
const REFERER_URL: &str = "https://twitter.com/";
const GUEST_TOKEN_HEADER: &str = "x-guest-token";

/// Feature flags the TweetResultByRestId operation expects
const TWEET_RESULT_FEATURES: &str = concat!(
    "{",
    r#""creator_subscriptions_tweet_preview_api_enabled":true,"#,
    r#""tweetypie_unmention_optimization_enabled":true,"#,
    r#""responsive_web_edit_tweet_api_enabled":true,"#,
    r#""graphql_is_translatable_rweb_tweet_is_translatable_enabled":true,"#,
    r#""view_counts_everywhere_api_enabled":true,"#,
    r#""longform_notetweets_consumption_enabled":true,"#,
    r#""responsive_web_twitter_article_tweet_consumption_enabled":false,"#,
    r#""tweet_awards_web_tipping_enabled":false,"#,
    r#""freedom_of_speech_not_reach_fetch_enabled":true,"#,
    r#""standardized_nudges_misinfo":true,"#,
    r#""tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled":true,"#,
    r#""longform_notetweets_rich_text_read_enabled":true,"#,
    r#""longform_notetweets_inline_media_enabled":true,"#,
    r#""responsive_web_graphql_exclude_directive_enabled":true,"#,
    r#""verified_phone_label_enabled":false,"#,
    r#""responsive_web_media_download_video_enabled":false,"#,
    r#""responsive_web_graphql_skip_user_profile_image_extensions_enabled":false,"#,
    r#""responsive_web_graphql_timeline_navigation_enabled":true,"#,
    r#""responsive_web_enhance_cards_enabled":false"#,
    "}"
);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TweetQueryVariables<'a> {
    tweet_id: &'a str,
    with_community: bool,
    include_promoted_content: bool,
    with_voice: bool,
}

/// `Authorization` header value carrying the application credential
pub(crate) fn bearer_authorization() -> String {
    format!("Bearer {}", BEARER_TOKEN)
}

/// JSON `variables` parameter for one tweet lookup
pub(crate) fn tweet_query_variables(tweet_id: &str) -> Result<String> {
    serde_json::to_string(&TweetQueryVariables {
        tweet_id,
        with_community: false,
        include_promoted_content: false,
        with_voice: false,
    })
    .map_err(|e| TweetVidError::Internal(format!("failed to encode query variables: {}", e)))
}

/// Authenticated fetcher for raw tweet payloads
///
/// Owns the HTTP client and the guest token manager. One attempt per call;
/// retrying is left to the caller.
pub struct TweetFetcher {
    http: reqwest::Client,
    tokens: GuestTokenManager,
    tweet_result_url: String,
}

impl TweetFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a fetcher with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TweetVidError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let activate_url = format!(
            "{}{}",
            config.api_base_url.trim_end_matches('/'),
            GUEST_ACTIVATE_PATH
        );
        let tokens = GuestTokenManager::new(
            http.clone(),
            activate_url,
            Duration::from_secs(config.token_lifetime_secs),
        );

        Ok(Self {
            http,
            tokens,
            tweet_result_url: format!(
                "{}{}",
                config.web_base_url.trim_end_matches('/'),
                TWEET_RESULT_PATH
            ),
        })
    }

    /// Guest token manager used by this fetcher
    pub fn tokens(&self) -> &GuestTokenManager {
        &self.tokens
    }

    /// Fetch the raw GraphQL payload for a tweet
    ///
    /// # Arguments
    /// * `tweet_id` - Numeric tweet identifier
    ///
    /// # Returns
    /// The decoded JSON response body
    ///
    /// # Errors
    /// - `AuthenticationFailure` - No guest token could be obtained, or
    ///   upstream rejected it with 401/403 (the token is discarded)
    /// - `NotFoundOrPrivate` - Upstream returned 404
    /// - `UpstreamRateLimited` - Upstream returned 429
    /// - `FetchFailed` - Any other non-2xx status or a network error
    /// - `MalformedPayload` - The 2xx body is not JSON
    pub async fn fetch_raw_post(&self, tweet_id: &str) -> Result<Value> {
        let guest_token = self.tokens.get_token().await?;
        let url = format!(
            "{}?variables={}&features={}",
            self.tweet_result_url,
            urlencoding::encode(&tweet_query_variables(tweet_id)?),
            urlencoding::encode(TWEET_RESULT_FEATURES)
        );

        debug!(tweet_id, "Fetching tweet data");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, bearer_authorization())
            .header(GUEST_TOKEN_HEADER, guest_token)
            .header(ACCEPT, "application/json")
            .header(REFERER, REFERER_URL)
            .send()
            .await
            .map_err(|e| TweetVidError::FetchFailed(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(TweetVidError::NotFoundOrPrivate(tweet_id.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(tweet_id, "Upstream rate limit hit");
            return Err(TweetVidError::UpstreamRateLimited);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(tweet_id, %status, "Guest token rejected, discarding it");
            self.tokens.invalidate();
            return Err(TweetVidError::AuthenticationFailure(format!(
                "guest token rejected: HTTP {}",
                status
            )));
        }

        if !status.is_success() {
            warn!(tweet_id, %status, "Upstream returned error status");
            return Err(TweetVidError::FetchFailed(format!("HTTP {}", status)));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                TweetVidError::MalformedPayload(format!("response is not JSON: {}", e))
            } else {
                TweetVidError::FetchFailed(e.to_string())
            }
        })
    }
}
