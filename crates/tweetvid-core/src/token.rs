//! Guest token management
//!
//! The upstream API only answers anonymous requests that carry a guest
//! token. Tokens are activated on first use, reused until they expire,
//! and refreshed lazily at read time.

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::deadline_after;
use crate::client::bearer_authorization;
use crate::error::{Result, TweetVidError};

/// Default guest token lifetime (2 hours)
pub const GUEST_TOKEN_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// An activated guest token and the moment it stops being used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestToken {
    pub token: String,
    pub expires_at: Instant,
}

impl GuestToken {
    /// Whether the token may still be used at `now`
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct ActivateResponse {
    guest_token: Option<String>,
}

/// Holds the single live guest token for a fetcher
///
/// Reads of a valid token never wait. When the token is absent or expired,
/// the refresh path is serialized so concurrent callers share one
/// activation request.
pub struct GuestTokenManager {
    http: reqwest::Client,
    activate_url: String,
    lifetime: Duration,
    slot: RwLock<Option<GuestToken>>,
    refresh: Mutex<()>,
}

impl GuestTokenManager {
    /// Create a manager that activates tokens at `activate_url`
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client (timeouts and user agent already set)
    /// * `activate_url` - Full URL of the guest activation endpoint
    /// * `lifetime` - How long an activated token is reused
    pub fn new(http: reqwest::Client, activate_url: String, lifetime: Duration) -> Self {
        Self {
            http,
            activate_url,
            lifetime,
            slot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Get a valid guest token, activating a new one if needed
    ///
    /// # Errors
    /// - `AuthenticationFailure` if the activation call fails, answers with a
    ///   non-2xx status, or the response has no `guest_token`
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.current() {
            debug!("Reusing cached guest token");
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have finished a refresh while we waited
        if let Some(token) = self.current() {
            return Ok(token);
        }

        let token = self.activate().await?;
        *self.slot.write() = Some(GuestToken {
            token: token.clone(),
            expires_at: deadline_after(Instant::now(), self.lifetime),
        });
        info!(lifetime_secs = self.lifetime.as_secs(), "Activated new guest token");

        Ok(token)
    }

    /// Drop the cached token so the next call activates a fresh one
    pub fn invalidate(&self) {
        if self.slot.write().take().is_some() {
            debug!("Discarded cached guest token");
        }
    }

    /// The cached token, if one exists and has not expired
    pub fn current(&self) -> Option<String> {
        let now = Instant::now();
        self.slot
            .read()
            .as_ref()
            .filter(|cached| cached.is_valid_at(now))
            .map(|cached| cached.token.clone())
    }

    async fn activate(&self) -> Result<String> {
        let response = self
            .http
            .post(&self.activate_url)
            .header(AUTHORIZATION, bearer_authorization())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| TweetVidError::AuthenticationFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Guest token activation rejected");
            return Err(TweetVidError::AuthenticationFailure(format!(
                "activation returned HTTP {}",
                status
            )));
        }

        let body: ActivateResponse = response
            .json()
            .await
            .map_err(|e| TweetVidError::AuthenticationFailure(e.to_string()))?;

        body.guest_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                TweetVidError::AuthenticationFailure(
                    "activation response has no guest_token".to_string(),
                )
            })
    }
}
