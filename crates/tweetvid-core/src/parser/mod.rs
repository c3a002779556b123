//! Payload parsers for the Twitter/X API
//!
//! Contains modules for parsing different response types.

pub mod video;

pub use video::{extract_video, truncate_caption};
