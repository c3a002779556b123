//! URL helper functions for Twitter/X
//!
//! Extracts tweet identifiers from the URL shapes users paste.

use regex::Regex;
use std::sync::LazyLock;

/// Minimum length of a bare numeric tweet identifier
pub const MIN_BARE_ID_LEN: usize = 15;

/// `<host>/<user>/status/<id>` on twitter.com or x.com, with an optional
/// legacy `#!/` marker. Anchored to the host, so `fox.com` does not pass
/// for `x.com` and a domain inside another site's path is ignored.
static STATUS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:[\w-]+\.)*(?:twitter|x)\.com/(?:#!/)?\w+/status(?:es)?/(\d+)")
        .expect("status URL pattern is valid")
});

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(\d{{{},}})$", MIN_BARE_ID_LEN)).expect("bare id pattern is valid")
});

/// Extracts the tweet identifier from a URL or a bare identifier
///
/// Patterns are tried in order: full status URL first, then a bare
/// numeric identifier of at least 15 digits.
///
/// # Arguments
/// * `url` - Tweet URL (e.g., "https://x.com/alice/status/1234567890123456789") or bare ID
///
/// # Returns
/// `Some(id)` with the digits, `None` if the input is not recognized
///
/// # Example
/// ```
/// use tweetvid_core::url::parse_tweet_id;
/// let id = parse_tweet_id("https://twitter.com/alice/status/1234567890123456789?s=20");
/// assert_eq!(id, Some("1234567890123456789".to_string()));
/// assert_eq!(parse_tweet_id("https://example.com/alice"), None);
/// ```
pub fn parse_tweet_id(url: &str) -> Option<String> {
    let input = url.trim();

    [&*STATUS_URL, &*BARE_ID]
        .iter()
        .find_map(|pattern| pattern.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Checks whether a tweet identifier can be extracted from the input
///
/// # Example
/// ```
/// use tweetvid_core::url::is_valid_tweet_url;
/// assert!(is_valid_tweet_url("https://x.com/alice/status/1234567890123456789"));
/// assert!(!is_valid_tweet_url("12345"));
/// ```
pub fn is_valid_tweet_url(url: &str) -> bool {
    parse_tweet_id(url).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_x_url() {
        let id = parse_tweet_id("https://x.com/alice/status/1234567890123456789");
        assert_eq!(id, Some("1234567890123456789".to_string()));
    }

    #[test]
    fn test_parse_twitter_url_with_query() {
        let id = parse_tweet_id("https://twitter.com/alice/status/1234567890123456789?s=20&t=abc");
        assert_eq!(id, Some("1234567890123456789".to_string()));
    }

    #[test]
    fn test_parse_mobile_and_www_hosts() {
        assert_eq!(
            parse_tweet_id("https://mobile.twitter.com/bob_1/status/1700000000000000001"),
            Some("1700000000000000001".to_string())
        );
        assert_eq!(
            parse_tweet_id("https://www.x.com/bob_1/status/1700000000000000001/video/1"),
            Some("1700000000000000001".to_string())
        );
    }

    #[test]
    fn test_parse_legacy_hashbang_and_statuses() {
        assert_eq!(
            parse_tweet_id("https://twitter.com/#!/alice/statuses/20"),
            Some("20".to_string())
        );
    }

    #[test]
    fn test_parse_url_without_scheme() {
        assert_eq!(
            parse_tweet_id("x.com/alice/status/1234567890123456789"),
            Some("1234567890123456789".to_string())
        );
    }

    #[test]
    fn test_parse_bare_id() {
        assert_eq!(
            parse_tweet_id("1234567890123456789"),
            Some("1234567890123456789".to_string())
        );
        assert_eq!(
            parse_tweet_id("  123456789012345\n"),
            Some("123456789012345".to_string())
        );
    }

    #[test]
    fn test_parse_short_bare_id_rejected() {
        assert_eq!(parse_tweet_id("12345678901234"), None);
    }

    #[test]
    fn test_parse_rejects_lookalike_host() {
        assert_eq!(parse_tweet_id("https://fox.com/alice/status/1234567890123456789"), None);
        assert_eq!(parse_tweet_id("https://nottwitter.com/a/status/1234567890123456789"), None);
    }

    #[test]
    fn test_parse_rejects_tweet_domain_in_foreign_path() {
        assert_eq!(
            parse_tweet_id("https://evil.com/x.com/alice/status/1234567890123456789"),
            None
        );
        assert_eq!(
            parse_tweet_id("https://example.org/?u=twitter.com/alice/status/1234567890123456789"),
            None
        );
    }

    #[test]
    fn test_parse_rejects_profile_url() {
        assert_eq!(parse_tweet_id("https://x.com/alice"), None);
        assert_eq!(parse_tweet_id(""), None);
    }

    #[test]
    fn test_is_valid_tweet_url() {
        assert!(is_valid_tweet_url("https://x.com/alice/status/1234567890123456789"));
        assert!(!is_valid_tweet_url("https://youtube.com/watch?v=abc"));
    }

    proptest! {
        #[test]
        fn prop_status_urls_yield_embedded_id(
            host in prop::sample::select(vec![
                "twitter.com", "x.com", "www.twitter.com", "mobile.twitter.com", "www.x.com",
            ]),
            scheme in prop::sample::select(vec!["https://", "http://", ""]),
            hashbang in any::<bool>(),
            user in "[A-Za-z0-9_]{1,15}",
            id in "[1-9][0-9]{0,18}",
        ) {
            let marker = if hashbang { "#!/" } else { "" };
            let url = format!("{scheme}{host}/{marker}{user}/status/{id}");
            prop_assert_eq!(parse_tweet_id(&url), Some(id));
        }

        #[test]
        fn prop_bare_ids_of_fifteen_or_more_digits(id in "[0-9]{15,25}") {
            prop_assert_eq!(parse_tweet_id(&id), Some(id.clone()));
        }

        #[test]
        fn prop_strings_without_digits_rejected(input in "[a-z./: ]{0,60}") {
            prop_assert_eq!(parse_tweet_id(&input), None);
        }

        #[test]
        fn prop_is_valid_matches_parse(input in ".{0,80}") {
            prop_assert_eq!(is_valid_tweet_url(&input), parse_tweet_id(&input).is_some());
        }
    }
}
