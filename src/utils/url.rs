//! URL processing utilities.
//!
//! Provides consistent URL handling across the codebase:
//! - Link type detection (external vs internal)
//! - Fragment and query-string splitting
//! - Percent-escape decoding for filesystem lookups

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Check if a link is external (has a URL scheme like http:, mailto:, etc.)
///
/// Protocol-relative links (`//cdn.example.com/...`) are also external.
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
///
/// # Examples
/// ```ignore
/// assert!(is_external_link("https://example.com"));
/// assert!(is_external_link("mailto:user@example.com"));
/// assert!(is_external_link("//cdn.example.com/lib.js"));
/// assert!(!is_external_link("/about"));
/// assert!(!is_external_link("./file.txt"));
/// ```
#[inline]
pub fn is_external_link(link: &str) -> bool {
    if link.starts_with("//") {
        return true;
    }
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Strip the `#fragment` and `?query` suffixes from a raw reference.
///
/// The first `#` or `?` terminates the path part, whichever comes first.
///
/// # Examples
/// ```ignore
/// assert_eq!(strip_suffixes("/about#team"), "/about");
/// assert_eq!(strip_suffixes("page?id=1#top"), "page");
/// ```
#[inline]
pub fn strip_suffixes(raw: &str) -> &str {
    let end = raw.find(['#', '?']).unwrap_or(raw.len());
    &raw[..end]
}

/// Split a raw reference into its path part and trailing `#`/`?` suffix.
#[inline]
pub fn split_suffixes(raw: &str) -> (&str, &str) {
    let end = raw.find(['#', '?']).unwrap_or(raw.len());
    raw.split_at(end)
}

/// Decode percent-escapes (`%20` etc.) for filesystem lookup.
///
/// Invalid UTF-8 after decoding falls back to the original string, so a
/// garbled reference resolves to "not found" rather than aborting the scan.
#[inline]
pub fn decode_percent(s: &str) -> Cow<'_, str> {
    match percent_decode_str(s).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(s),
    }
}
