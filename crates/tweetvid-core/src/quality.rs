//! Bitrate based quality labels and ordering for video variants

use crate::types::VideoVariant;

/// Bitrate floors (bits/sec) for each label, highest first
const QUALITY_THRESHOLDS: [(u64, &str); 4] = [
    (2_000_000, "1080p"),
    (1_000_000, "720p"),
    (500_000, "480p"),
    (250_000, "360p"),
];

const LOWEST_QUALITY: &str = "240p";

/// Maps a bitrate to a human-readable quality label
///
/// # Example
/// ```
/// use tweetvid_core::label_for_bitrate;
/// assert_eq!(label_for_bitrate(2_000_000), "1080p");
/// assert_eq!(label_for_bitrate(1_999_999), "720p");
/// assert_eq!(label_for_bitrate(0), "240p");
/// ```
pub fn label_for_bitrate(bitrate: u64) -> &'static str {
    QUALITY_THRESHOLDS
        .iter()
        .find(|(floor, _)| bitrate >= *floor)
        .map(|(_, label)| *label)
        .unwrap_or(LOWEST_QUALITY)
}

/// Sorts variants highest bitrate first
///
/// The sort is stable: variants with equal bitrates keep their input order.
pub fn sort_by_bitrate_desc(mut variants: Vec<VideoVariant>) -> Vec<VideoVariant> {
    variants.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));
    variants
}
