//! Text cleanup before speech synthesis

use once_cell::sync::Lazy;
use regex::Regex;

/// Spoken in place of every URL
pub const URL_PLACEHOLDER: &str = "URL省略";

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://[A-Za-z0-9!?/+\-_~=;:.,*&@#$%()'\[\]]+").expect("valid URL regex")
});

// mentions, custom emoji, channel links and any other angle-bracket markup
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Replace URLs with [`URL_PLACEHOLDER`], then drop `<...>` tags
pub fn sanitize(text: &str) -> String {
    let without_urls = URL_PATTERN.replace_all(text, URL_PLACEHOLDER);
    TAG_PATTERN.replace_all(&without_urls, "").into_owned()
}
