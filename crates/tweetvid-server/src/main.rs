use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tweetvid_core::{ResultCache, TweetFetcher, TweetScraper};
use tweetvid_server::build_router;
use tweetvid_server::config::{LogFormat, ServerConfig};

const DEFAULT_LOG_FILTER: &str = "info,tweetvid_core=info,tweetvid_server=info";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();
    init_logging(config.log_format);

    let cache = Arc::new(ResultCache::with_ttl(config.cache_ttl()));
    let _reaper = Arc::clone(&cache).spawn_reaper(config.cache_reap_interval());

    let fetcher = TweetFetcher::with_config(config.client_config())
        .context("Failed to create upstream HTTP client")?;
    let scraper = Arc::new(TweetScraper::from_parts(Arc::new(fetcher), cache));

    let app = build_router(scraper, &config)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        %addr,
        cache_ttl_secs = config.cache_ttl_secs,
        upstream_timeout_secs = config.upstream_timeout_secs,
        "Server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with((format == LogFormat::Json).then(|| fmt::layer().json()))
        .with((format == LogFormat::Pretty).then(fmt::layer))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
