//! Per-client fixed-window rate limiting

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::error::ApiError;

pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Windows are pruned once the table grows past this many clients
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per client IP in fixed windows
///
/// Clients whose address is unknown share one bucket.
#[derive(Debug)]
pub struct ClientRateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<Option<IpAddr>, Window>>,
}

impl ClientRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, RATE_LIMIT_WINDOW)
    }

    /// Record one request from `client`
    ///
    /// # Errors
    /// Returns the time until the client's window resets when the limit
    /// is already used up.
    pub fn check(&self, client: Option<IpAddr>) -> Result<(), Duration> {
        let now = Instant::now();
        let mut windows = self.windows.lock();

        if windows.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            return Err(self.window.saturating_sub(now.duration_since(entry.started)));
        }
        entry.count += 1;
        Ok(())
    }
}

/// Middleware rejecting requests over the limit with 429
pub async fn enforce(
    State(limiter): State<Arc<ClientRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match limiter.check(client) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(client = ?client, path = %request.uri().path(), "Rate limit exceeded");
            ApiError::TooManyRequests { retry_after }.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> Option<IpAddr> {
        Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_applies_within_window() {
        let limiter = ClientRateLimiter::per_minute(3);
        for _ in 0..3 {
            assert!(limiter.check(ip(1)).is_ok());
        }

        tokio::time::advance(Duration::from_secs(20)).await;
        let retry_after = limiter.check(ip(1)).unwrap_err();
        assert_eq!(retry_after, Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = ClientRateLimiter::per_minute(1);
        assert!(limiter.check(ip(1)).is_ok());
        assert!(limiter.check(ip(1)).is_err());

        tokio::time::advance(RATE_LIMIT_WINDOW).await;
        assert!(limiter.check(ip(1)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_are_counted_separately() {
        let limiter = ClientRateLimiter::per_minute(1);
        assert!(limiter.check(ip(1)).is_ok());
        assert!(limiter.check(ip(2)).is_ok());
        assert!(limiter.check(None).is_ok());
        assert!(limiter.check(ip(1)).is_err());
        assert!(limiter.check(None).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_windows_are_pruned() {
        let limiter = ClientRateLimiter::per_minute(1);
        for last in 0..=255u8 {
            for third in 0..4u8 {
                let addr = IpAddr::V4(Ipv4Addr::new(10, 0, third, last));
                assert!(limiter.check(Some(addr)).is_ok());
            }
        }
        assert_eq!(limiter.windows.lock().len(), PRUNE_THRESHOLD);

        tokio::time::advance(RATE_LIMIT_WINDOW).await;
        assert!(limiter.check(ip(1)).is_ok());
        assert_eq!(limiter.windows.lock().len(), 1);
    }
}
