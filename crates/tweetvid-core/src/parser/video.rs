//! Video extractor for TweetResultByRestId payloads
//!
//! Walks the GraphQL response down to the tweet's media, picks the first
//! video (or animated GIF), and keeps its MP4 renditions.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TweetVidError};
use crate::quality::{label_for_bitrate, sort_by_bitrate_desc};
use crate::types::{ExtractionResult, VideoVariant};

/// Caption length kept before appending [`ELLIPSIS`]
pub const CAPTION_LIMIT: usize = 100;
pub const ELLIPSIS: &str = "...";
/// Author placeholder when the payload has no screen name
pub const UNKNOWN_AUTHOR: &str = "unknown";

const PLAYABLE_CONTENT_TYPE: &str = "video/mp4";
const VIDEO_MEDIA_TYPES: [&str; 2] = ["video", "animated_gif"];

// ---------------------------------------------------------------------------
// Payload shape (only the fields we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "tweetResult")]
    tweet_result: Option<TweetResultWrapper>,
}

#[derive(Debug, Deserialize)]
struct TweetResultWrapper {
    result: Option<TweetResult>,
}

/// A tweet, or a visibility wrapper holding the tweet under `tweet`
#[derive(Debug, Deserialize)]
struct TweetResult {
    tweet: Option<Box<TweetResult>>,
    core: Option<TweetCore>,
    legacy: Option<TweetLegacy>,
}

#[derive(Debug, Deserialize)]
struct TweetCore {
    user_results: Option<UserResults>,
}

#[derive(Debug, Deserialize)]
struct UserResults {
    result: Option<UserResult>,
}

#[derive(Debug, Deserialize)]
struct UserResult {
    legacy: Option<UserLegacy>,
}

#[derive(Debug, Deserialize)]
struct UserLegacy {
    screen_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TweetLegacy {
    full_text: Option<String>,
    extended_entities: Option<ExtendedEntities>,
}

#[derive(Debug, Deserialize)]
struct ExtendedEntities {
    #[serde(default)]
    media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(rename = "type")]
    kind: Option<String>,
    media_url_https: Option<String>,
    video_info: Option<VideoInfo>,
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    variants: Vec<RawVariant>,
}

#[derive(Debug, Deserialize)]
struct RawVariant {
    bitrate: Option<u64>,
    content_type: Option<String>,
    url: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Extracts the downloadable video variants from a raw tweet payload
///
/// # Arguments
/// * `raw` - Decoded TweetResultByRestId response
/// * `tweet_id` - Identifier the payload was fetched for
///
/// # Returns
/// An [`ExtractionResult`] with MP4 variants sorted highest bitrate first
///
/// # Errors
/// - `MalformedPayload` if the result/legacy structure is missing or mistyped
/// - `NoVideoPresent` if no video/animated GIF media with video info exists
/// - `NoPlayableFormat` if the video has no MP4 variant
pub fn extract_video(raw: &Value, tweet_id: &str) -> Result<ExtractionResult> {
    let response = GraphqlResponse::deserialize(raw)
        .map_err(|e| TweetVidError::MalformedPayload(e.to_string()))?;

    let result = response
        .data
        .and_then(|data| data.tweet_result)
        .and_then(|wrapper| wrapper.result)
        .ok_or_else(|| TweetVidError::MalformedPayload("missing tweet result".to_string()))?;

    let tweet = match result.tweet {
        Some(inner) => *inner,
        None => result,
    };

    let legacy = tweet
        .legacy
        .ok_or_else(|| TweetVidError::MalformedPayload("missing tweet legacy data".to_string()))?;

    let username = tweet
        .core
        .and_then(|core| core.user_results)
        .and_then(|users| users.result)
        .and_then(|user| user.legacy)
        .and_then(|user| user.screen_name)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let media = legacy
        .extended_entities
        .map(|entities| entities.media)
        .unwrap_or_default();

    let video = media
        .into_iter()
        .find(|item| {
            item.kind
                .as_deref()
                .is_some_and(|kind| VIDEO_MEDIA_TYPES.contains(&kind))
        })
        .ok_or(TweetVidError::NoVideoPresent)?;

    let video_info = video.video_info.ok_or(TweetVidError::NoVideoPresent)?;

    let variants: Vec<VideoVariant> = video_info
        .variants
        .into_iter()
        .filter(|variant| variant.content_type.as_deref() == Some(PLAYABLE_CONTENT_TYPE))
        .filter_map(|variant| {
            let bitrate = variant.bitrate.unwrap_or(0);
            variant.url.map(|url| VideoVariant {
                quality: label_for_bitrate(bitrate).to_string(),
                bitrate,
                url,
            })
        })
        .collect();

    debug!(tweet_id, variants = variants.len(), "Extracted MP4 variants");

    ExtractionResult::new(
        tweet_id.to_string(),
        username,
        truncate_caption(legacy.full_text.as_deref().unwrap_or_default()),
        video.media_url_https.unwrap_or_default(),
        sort_by_bitrate_desc(variants),
    )
    .ok_or(TweetVidError::NoPlayableFormat)
}

/// Truncates a caption to [`CAPTION_LIMIT`] characters plus [`ELLIPSIS`]
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate_caption(text: &str) -> String {
    match text.char_indices().nth(CAPTION_LIMIT) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TWEET_ID: &str = "1234567890123456789";

    fn payload_with_media(media: Value) -> Value {
        json!({
            "data": {
                "tweetResult": {
                    "result": {
                        "__typename": "Tweet",
                        "rest_id": TWEET_ID,
                        "core": {
                            "user_results": {
                                "result": { "legacy": { "screen_name": "alice" } }
                            }
                        },
                        "legacy": {
                            "full_text": "Look at this clip",
                            "extended_entities": { "media": media }
                        }
                    }
                }
            }
        })
    }

    fn video_media(variants: Value) -> Value {
        json!({
            "type": "video",
            "media_url_https": "https://pbs.twimg.com/ext_tw_video_thumb/1/pu/img/thumb.jpg",
            "video_info": { "variants": variants }
        })
    }

    // -----------------------------------------------------------------------
    // extract_video: success paths
    // -----------------------------------------------------------------------

    #[test]
    fn test_extract_sorts_and_picks_best() {
        let raw = payload_with_media(json!([video_media(json!([
            { "bitrate": 800000, "content_type": "video/mp4", "url": "https://video.twimg.com/480.mp4" },
            { "content_type": "application/x-mpegURL", "url": "https://video.twimg.com/pl.m3u8" },
            { "bitrate": 2500000, "content_type": "video/mp4", "url": "https://video.twimg.com/1080.mp4" }
        ]))]));

        let result = extract_video(&raw, TWEET_ID).unwrap();
        assert_eq!(result.tweet_id, TWEET_ID);
        assert_eq!(result.username, "alice");
        assert_eq!(result.text, "Look at this clip");
        assert_eq!(
            result.thumbnail,
            "https://pbs.twimg.com/ext_tw_video_thumb/1/pu/img/thumb.jpg"
        );
        assert_eq!(result.variants.len(), 2);
        assert!(result.variants[0].bitrate >= result.variants[1].bitrate);
        assert_eq!(result.best_quality.quality, "1080p");
        assert_eq!(result.best_quality, result.variants[0]);
        assert_eq!(result.variants[1].quality, "480p");
    }

    #[test]
    fn test_extract_animated_gif_without_bitrate() {
        let raw = payload_with_media(json!([{
            "type": "animated_gif",
            "media_url_https": "https://pbs.twimg.com/tweet_video_thumb/gif.jpg",
            "video_info": { "variants": [
                { "bitrate": 0, "content_type": "video/mp4", "url": "https://video.twimg.com/tweet_video/gif.mp4" }
            ] }
        }]));

        let result = extract_video(&raw, TWEET_ID).unwrap();
        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.best_quality.quality, "240p");
        assert_eq!(result.best_quality.bitrate, 0);
    }

    #[test]
    fn test_extract_skips_photos_before_video() {
        let raw = payload_with_media(json!([
            { "type": "photo", "media_url_https": "https://pbs.twimg.com/media/photo.jpg" },
            video_media(json!([
                { "bitrate": 1280000, "content_type": "video/mp4", "url": "https://video.twimg.com/720.mp4" }
            ]))
        ]));

        let result = extract_video(&raw, TWEET_ID).unwrap();
        assert_eq!(result.best_quality.quality, "720p");
    }

    #[test]
    fn test_extract_visibility_wrapper() {
        let raw = json!({
            "data": { "tweetResult": { "result": {
                "__typename": "TweetWithVisibilityResults",
                "tweet": {
                    "legacy": {
                        "full_text": "wrapped",
                        "extended_entities": { "media": [video_media(json!([
                            { "bitrate": 632000, "content_type": "video/mp4", "url": "https://video.twimg.com/480.mp4" }
                        ]))] }
                    }
                }
            } } }
        });

        let result = extract_video(&raw, TWEET_ID).unwrap();
        assert_eq!(result.text, "wrapped");
        assert_eq!(result.username, UNKNOWN_AUTHOR);
    }

    // -----------------------------------------------------------------------
    // extract_video: failures
    // -----------------------------------------------------------------------

    #[test]
    fn test_extract_missing_result() {
        let raw = json!({ "data": { "tweetResult": {} } });
        assert!(matches!(
            extract_video(&raw, TWEET_ID),
            Err(TweetVidError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_extract_missing_legacy() {
        let raw = json!({ "data": { "tweetResult": { "result": { "__typename": "TweetTombstone" } } } });
        assert!(matches!(
            extract_video(&raw, TWEET_ID),
            Err(TweetVidError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_extract_mistyped_payload() {
        let raw = json!({ "data": "nope" });
        assert!(matches!(
            extract_video(&raw, TWEET_ID),
            Err(TweetVidError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_extract_no_video_media() {
        let raw = payload_with_media(json!([
            { "type": "photo", "media_url_https": "https://pbs.twimg.com/media/photo.jpg" }
        ]));
        assert_eq!(
            extract_video(&raw, TWEET_ID),
            Err(TweetVidError::NoVideoPresent)
        );
    }

    #[test]
    fn test_extract_no_media_at_all() {
        let raw = json!({
            "data": { "tweetResult": { "result": { "legacy": { "full_text": "just text" } } } }
        });
        assert_eq!(
            extract_video(&raw, TWEET_ID),
            Err(TweetVidError::NoVideoPresent)
        );
    }

    #[test]
    fn test_extract_video_without_video_info() {
        let raw = payload_with_media(json!([{ "type": "video" }]));
        assert_eq!(
            extract_video(&raw, TWEET_ID),
            Err(TweetVidError::NoVideoPresent)
        );
    }

    #[test]
    fn test_extract_only_non_mp4() {
        let raw = payload_with_media(json!([video_media(json!([
            { "content_type": "application/x-mpegURL", "url": "https://video.twimg.com/pl.m3u8" }
        ]))]));
        assert_eq!(
            extract_video(&raw, TWEET_ID),
            Err(TweetVidError::NoPlayableFormat)
        );
    }

    // -----------------------------------------------------------------------
    // truncate_caption
    // -----------------------------------------------------------------------

    #[test]
    fn test_truncate_long_caption() {
        let text = "a".repeat(150);
        let caption = truncate_caption(&text);
        assert_eq!(caption, format!("{}...", "a".repeat(100)));
    }

    #[test]
    fn test_truncate_keeps_short_caption() {
        let exact = "b".repeat(100);
        assert_eq!(truncate_caption(&exact), exact);
        assert_eq!(truncate_caption(""), "");
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "é".repeat(101);
        let caption = truncate_caption(&text);
        assert_eq!(caption.chars().count(), 103);
        assert!(caption.starts_with(&"é".repeat(100)));
        assert!(caption.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_extract_truncates_caption() {
        let mut raw = payload_with_media(json!([video_media(json!([
            { "bitrate": 2176000, "content_type": "video/mp4", "url": "https://video.twimg.com/1080.mp4" }
        ]))]));
        raw["data"]["tweetResult"]["result"]["legacy"]["full_text"] = json!("x".repeat(120));

        let result = extract_video(&raw, TWEET_ID).unwrap();
        assert_eq!(result.text.len(), 103);
        assert!(result.text.ends_with("..."));
    }
}
