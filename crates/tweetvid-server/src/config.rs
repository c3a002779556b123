//! Server configuration
//!
//! Every option is a command-line flag that falls back to an environment
//! variable (a `.env` file is loaded first by the binary).

use std::time::Duration;

use clap::{Parser, ValueEnum};
use tweetvid_core::ClientConfig;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_REAP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_API_RATE_LIMIT: u32 = 10;
pub const DEFAULT_DOWNLOAD_RATE_LIMIT: u32 = 5;

/// Upper bound for the upstream timeout
pub const MAX_UPSTREAM_TIMEOUT_SECS: u64 = 300;
/// Upper bound for cache TTL and reap interval (one day)
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tweetvid-server",
    version,
    about = "HTTP API resolving Twitter/X posts to downloadable video URLs"
)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Allowed CORS origin; any origin when unset or "*"
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Timeout for each upstream request, in seconds
    #[arg(
        long,
        env = "UPSTREAM_TIMEOUT_SECS",
        default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_UPSTREAM_TIMEOUT_SECS)
    )]
    pub upstream_timeout_secs: u64,

    /// Lifetime of cached extraction results, in seconds
    #[arg(
        long,
        env = "CACHE_TTL_SECS",
        default_value_t = DEFAULT_CACHE_TTL_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_SECS)
    )]
    pub cache_ttl_secs: u64,

    /// Period between sweeps removing expired cache entries, in seconds
    #[arg(
        long,
        env = "CACHE_REAP_INTERVAL_SECS",
        default_value_t = DEFAULT_CACHE_REAP_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_SECS)
    )]
    pub cache_reap_interval_secs: u64,

    /// Requests per minute per client across all /api routes
    #[arg(
        long,
        env = "API_RATE_LIMIT",
        default_value_t = DEFAULT_API_RATE_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub api_rate_limit: u32,

    /// Download requests per minute per client
    #[arg(
        long,
        env = "DOWNLOAD_RATE_LIMIT",
        default_value_t = DEFAULT_DOWNLOAD_RATE_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub download_rate_limit: u32,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origin: None,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_reap_interval_secs: DEFAULT_CACHE_REAP_INTERVAL_SECS,
            api_rate_limit: DEFAULT_API_RATE_LIMIT,
            download_rate_limit: DEFAULT_DOWNLOAD_RATE_LIMIT,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    /// Address string for the listener, e.g. "0.0.0.0:5000"
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upstream client settings derived from this configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout_secs: self.upstream_timeout_secs,
            ..ClientConfig::default()
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_reap_interval(&self) -> Duration {
        Duration::from_secs(self.cache_reap_interval_secs)
    }
}
