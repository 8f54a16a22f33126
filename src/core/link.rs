//! Syntactic classification of raw references.

use crate::utils::url::is_external_link;

/// Where a raw reference points, judged from its spelling alone.
///
/// Classification never touches the filesystem; it decides whether the
/// resolver looks at the tree at all, and from which base directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    /// Carries a URL scheme (`https:`, `mailto:`, `data:`, ...) or is
    /// protocol-relative (`//host/...`). Out of scope for resolution.
    External,
    /// Bare in-page anchor (`#section`, also `./#section`).
    InPage,
    /// Starts with `/`: resolved against the site root.
    Rooted,
    /// Everything else: resolved against the source document's directory.
    Relative,
}

impl LinkScope {
    pub fn classify(raw: &str) -> Self {
        if is_external_link(raw) {
            Self::External
        } else if raw.starts_with('#') || raw.starts_with("./#") {
            Self::InPage
        } else if raw.starts_with('/') {
            Self::Rooted
        } else {
            Self::Relative
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        use LinkScope::*;

        let cases = [
            ("https://example.com", External),
            ("mailto:user@example.com", External),
            ("tel:+1234567890", External),
            ("javascript:void(0)", External),
            ("data:image/png;base64,AAAA", External),
            ("//cdn.example.com/x.js", External),
            ("#section", InPage),
            ("#", InPage),
            ("./#section", InPage),
            ("/about", Rooted),
            ("/about#team", Rooted),
            ("./image.png", Relative),
            ("../other", Relative),
            ("team", Relative),
            // a fragment after a path is still a path reference
            ("index.html#contact", Relative),
        ];
        for (raw, expected) in cases {
            assert_eq!(LinkScope::classify(raw), expected, "raw {raw:?}");
        }
    }
}
