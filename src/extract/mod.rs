//! Tolerant reference extraction from raw HTML text.
//!
//! The corpus contains imperfect markup, so this is pattern scanning, not
//! parsing: a malformed tag is skipped and the rest of the document still
//! scans. The contract is narrow:
//!
//! - tags are recognized up to their closing `>`; a tag with no closing
//!   `>` before the next `<` is ignored;
//! - attributes must be quoted (single or double); bare values are
//!   ignored, order and case do not matter;
//! - `srcset` expands into one reference per comma-separated candidate,
//!   width/density descriptors dropped;
//! - `url(...)` is matched anywhere in the text, which covers `<style>`
//!   blocks and inline `style` attributes alike.
//!
//! References keep the raw attribute value byte-for-byte so the fixer can
//! splice edits without disturbing anything else.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::{RefKind, Reference};

// `[^<>]*` keeps a tag match from running past an unclosed tag into the
// next one.
static A_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^<>]*>").unwrap());
static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^<>]*>").unwrap());
static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^<>]*>").unwrap());
static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\(\s*['"]?([^)'"]+?)['"]?\s*\)"#).unwrap());
static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^<>]*>").unwrap());
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9-]*)\s*=\s*("([^"]*)"|'([^']*)')"#).unwrap()
});

/// Extract all references from a document's raw text, in source order.
pub fn extract_references(text: &str) -> Vec<Reference> {
    let mut found: Vec<(usize, Reference)> = Vec::new();

    for m in A_TAG.find_iter(text) {
        if let Some(href) = attr_value(m.as_str(), "href") {
            if href.is_empty() {
                continue;
            }
            let line = line_of(text, m.start());
            found.push((m.start(), Reference::new(RefKind::Hyperlink, href, line)));
        }
    }

    for m in IMG_TAG.find_iter(text) {
        let line = line_of(text, m.start());
        let alt = attr_value(m.as_str(), "alt");
        if let Some(src) = attr_value(m.as_str(), "src") {
            if !src.is_empty() {
                let mut r = Reference::new(RefKind::ImageSrc, src, line);
                r.alt = alt.map(str::to_string).filter(|a| !a.is_empty());
                found.push((m.start(), r));
            }
        }
        if let Some(srcset) = attr_value(m.as_str(), "srcset") {
            for candidate in srcset.split(',') {
                // "image-480.webp 480w" -> url is the first token
                if let Some(url) = candidate.split_whitespace().next() {
                    found.push((
                        m.start(),
                        Reference::new(RefKind::SrcsetCandidate, url, line),
                    ));
                }
            }
        }
    }

    for m in LINK_TAG.find_iter(text) {
        let tag = m.as_str();
        let is_alternate = attr_value(tag, "rel")
            .is_some_and(|rel| rel.eq_ignore_ascii_case("alternate"));
        if !is_alternate {
            continue;
        }
        let (Some(lang), Some(href)) = (attr_value(tag, "hreflang"), attr_value(tag, "href"))
        else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        let mut r = Reference::new(RefKind::Hreflang, href, line_of(text, m.start()));
        r.hreflang = Some(lang.to_ascii_lowercase());
        found.push((m.start(), r));
    }

    for c in CSS_URL.captures_iter(text) {
        let m = c.get(0).unwrap();
        let url = c.get(1).unwrap().as_str().trim();
        if url.is_empty() {
            continue;
        }
        found.push((
            m.start(),
            Reference::new(RefKind::CssUrl, url, line_of(text, m.start())),
        ));
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, r)| r).collect()
}

/// Extract the hreflang declaration map of a document:
/// `(locale code, raw href)` pairs in source order.
pub fn hreflang_declarations(refs: &[Reference]) -> Vec<(&str, &str)> {
    refs.iter()
        .filter(|r| r.kind == RefKind::Hreflang)
        .filter_map(|r| r.hreflang.as_deref().map(|lang| (lang, r.raw.as_str())))
        .collect()
}

/// Whether the document opts out of indexing via a robots meta tag.
pub fn has_noindex(text: &str) -> bool {
    META_TAG.find_iter(text).any(|m| {
        let tag = m.as_str();
        attr_value(tag, "name").is_some_and(|n| n.eq_ignore_ascii_case("robots"))
            && attr_value(tag, "content").is_some_and(|c| {
                c.split(',').any(|v| v.trim().eq_ignore_ascii_case("noindex"))
            })
    })
}

/// Value of a quoted attribute inside a tag's text, case-insensitive name.
fn attr_value<'t>(tag: &'t str, name: &str) -> Option<&'t str> {
    ATTR.captures_iter(tag).find_map(|c| {
        let key = c.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        c.get(3).or_else(|| c.get(4)).map(|m| m.as_str())
    })
}

/// 1-based line number of a byte offset.
fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperlinks() {
        let html = r#"<p><a href="/about.html">about</a> <a href='team'>team</a></p>"#;
        let refs = extract_references(html);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, RefKind::Hyperlink);
        assert_eq!(refs[0].raw, "/about.html");
        assert_eq!(refs[1].raw, "team");
    }

    #[test]
    fn test_anchor_without_href_skipped() {
        let refs = extract_references(r#"<a name="top">x</a> <a href="">y</a>"#);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_img_src_and_alt() {
        let html = r#"<img src="/assets/logo.webp" alt="Company logo">"#;
        let refs = extract_references(html);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, RefKind::ImageSrc);
        assert_eq!(refs[0].raw, "/assets/logo.webp");
        assert_eq!(refs[0].alt.as_deref(), Some("Company logo"));
    }

    #[test]
    fn test_srcset_expansion() {
        let html = r#"<img src="hero.webp" srcset="hero-480.webp 480w, hero-960.webp 960w, hero.webp">"#;
        let refs = extract_references(html);
        let candidates: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == RefKind::SrcsetCandidate)
            .map(|r| r.raw.as_str())
            .collect();
        assert_eq!(candidates, ["hero-480.webp", "hero-960.webp", "hero.webp"]);
    }

    #[test]
    fn test_css_url() {
        let html = r#"<div style="background: url('../img/bg.webp')"></div>
            <style>body { background-image: url(/img/tile.png); }</style>"#;
        let refs = extract_references(html);
        let urls: Vec<_> = refs
            .iter()
            .filter(|r| r.kind == RefKind::CssUrl)
            .map(|r| r.raw.as_str())
            .collect();
        assert_eq!(urls, ["../img/bg.webp", "/img/tile.png"]);
    }

    #[test]
    fn test_hreflang_declarations() {
        let html = r#"
            <link rel="alternate" hreflang="en" href="https://example.com/about.html">
            <link hreflang='it' href='/it/about.html' rel='alternate'>
            <link rel="stylesheet" href="/style.css">
        "#;
        let refs = extract_references(html);
        let decls = hreflang_declarations(&refs);
        assert_eq!(
            decls,
            [
                ("en", "https://example.com/about.html"),
                ("it", "/it/about.html")
            ]
        );
    }

    #[test]
    fn test_malformed_tag_does_not_poison_document() {
        // First <a is never closed before the next tag; the scan skips it
        // and still finds the later links.
        let html = "<a href=\"broken\n<a href=\"/ok.html\">fine</a>";
        let refs = extract_references(html);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "/ok.html");
    }

    #[test]
    fn test_placeholder_flagged_not_dropped() {
        let refs = extract_references(r#"<a href="{{ base }}/about">x</a>"#);
        assert_eq!(refs.len(), 1);
        assert!(refs[0].is_placeholder());
    }

    #[test]
    fn test_line_numbers() {
        let html = "line one\n<a href=\"/a.html\">a</a>\n\n<img src=\"b.png\">";
        let refs = extract_references(html);
        assert_eq!(refs[0].line, 2);
        assert_eq!(refs[1].line, 4);
    }

    #[test]
    fn test_ordered_by_position() {
        let html = r#"<img src="first.png"><a href="/second.html">x</a><div style="background:url(third.png)"></div>"#;
        let refs = extract_references(html);
        assert_eq!(refs[0].raw, "first.png");
        assert_eq!(refs[1].raw, "/second.html");
        assert_eq!(refs[2].raw, "third.png");
    }

    #[test]
    fn test_has_noindex() {
        assert!(has_noindex(
            r#"<head><meta name="robots" content="noindex, nofollow"></head>"#
        ));
        assert!(has_noindex(r#"<meta content="NOINDEX" name="ROBOTS">"#));
        assert!(!has_noindex(r#"<meta name="robots" content="index, follow">"#));
        assert!(!has_noindex(r#"<meta name="description" content="noindex">"#));
    }

    #[test]
    fn test_case_insensitive_tags_and_attrs() {
        let html = r#"<A HREF="/caps.html">x</A><IMG SRC="pic.webp" Alt="pic">"#;
        let refs = extract_references(html);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].raw, "/caps.html");
        assert_eq!(refs[1].alt.as_deref(), Some("pic"));
    }
}
