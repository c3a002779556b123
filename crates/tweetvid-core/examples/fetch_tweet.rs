//! Debug script to resolve a tweet's video variants
//!
//! Run with: cargo run --example fetch_tweet -p tweetvid-core -- <tweet-url>

use tweetvid_core::{TweetFetcher, TweetScraper, parse_tweet_id};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .ok_or("usage: fetch_tweet <tweet-url>")?;

    let scraper = TweetScraper::new()?;

    println!("Resolving {}...\n", url);

    match scraper.download_video(&url).await {
        Ok(video) => {
            println!("✓ @{}: {}", video.username, video.text);
            println!("  Thumbnail: {}\n", video.thumbnail);

            for (i, variant) in video.variants.iter().enumerate() {
                println!("{}. {} ({} bps)", i + 1, variant.quality, variant.bitrate);
                println!("   {}", variant.url);
            }
        }
        Err(e) => {
            println!("✗ Failed to extract video: {}", e);

            // Debug: fetch and save the raw payload for inspection
            let Some(tweet_id) = parse_tweet_id(&url) else {
                return Ok(());
            };
            println!("\nFetching raw payload for debugging...");
            let raw = TweetFetcher::new()?.fetch_raw_post(&tweet_id).await?;

            std::fs::write("debug_tweet.json", serde_json::to_string_pretty(&raw)?)?;
            println!("Payload saved to debug_tweet.json");
        }
    }

    Ok(())
}
