//! Sitemap generation with locale alternates and image metadata.
//!
//! One `<url>` per (group, locale) pair, in locale-key order then locale
//! order, so the output is byte-identical across runs on an unchanged
//! tree. Pages carrying a `noindex` robots meta and groups poisoned by a
//! locale collision are excluded.

use anyhow::Result;
use rustc_hash::FxHashSet;
use std::path::Path;

use crate::config::SiteConfig;
use crate::core::RefKind;
use crate::locale::{LocaleGraph, PageGroup};
use crate::resolve::Resolver;
use crate::site::Document;
use crate::utils::date::format_ymd;
use crate::utils::fsx::write_atomic;
use crate::utils::xml::escape_xml;

/// One image of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Absolute URL of the image file.
    pub loc: String,
    /// Caption from the `alt` attribute, if any.
    pub title: Option<String>,
}

/// One `<url>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub priority: String,
    /// `(hreflang code, absolute URL)` pairs, including the `x-default`
    /// entry where applicable.
    pub alternates: Vec<(String, String)>,
    pub images: Vec<Image>,
}

/// Map a locale key and locale to the canonical URL path.
///
/// The extension is already stripped by the key; a leaf equal to the index
/// stem collapses to a trailing slash, and non-default locales get their
/// prefix back.
fn url_path(key: &str, locale: &str, config: &SiteConfig) -> String {
    let stem = config.index_stem();
    let key = if key == stem {
        ""
    } else {
        key.strip_suffix(&format!("/{stem}"))
            .map(|k| &key[..k.len() + 1])
            .unwrap_or(key)
    };

    let mut path = String::from("/");
    if locale != config.locale.default {
        path.push_str(locale);
        path.push('/');
    }
    path.push_str(key);
    path
}

fn priority<'c>(key: &str, locale: &str, config: &'c SiteConfig) -> &'c str {
    let sitemap = &config.sitemap;
    if key == config.index_stem() && locale == config.locale.default {
        return &sitemap.priority_home;
    }
    let section_match = sitemap
        .section
        .as_deref()
        .is_some_and(|s| key == s || key.starts_with(&format!("{s}/")));
    if section_match {
        &sitemap.priority_section
    } else {
        &sitemap.priority_base
    }
}

/// Collect the resolved, deduplicated images of a page.
fn page_images(
    doc: &Document,
    resolver: &Resolver,
    config: &SiteConfig,
    base: &str,
) -> Vec<Image> {
    let mut seen = FxHashSet::default();
    let mut images = Vec::new();
    for r in doc.references() {
        if !matches!(r.kind, RefKind::ImageSrc | RefKind::SrcsetCandidate) {
            continue;
        }
        let Some(target) = resolver.resolve(doc.dir(), &r.raw).target().map(Path::to_path_buf)
        else {
            continue;
        };
        let loc = format!("{base}/{}", config.root_relative(&target));
        if seen.insert(loc.clone()) {
            images.push(Image {
                loc,
                title: r.alt.clone(),
            });
        }
    }
    images
}

/// Build the entry list for a locale graph.
pub fn build_entries(
    graph: &LocaleGraph,
    resolver: &Resolver,
    config: &SiteConfig,
) -> Result<Vec<SitemapEntry>> {
    let base = config.base_url()?;
    let mut entries = Vec::new();

    for group in graph.groups() {
        if group.poisoned {
            continue;
        }
        for (&locale, &doc) in &group.members {
            if doc.noindex() {
                continue;
            }
            entries.push(build_entry(group, locale, doc, resolver, config, base));
        }
    }
    Ok(entries)
}

fn build_entry(
    group: &PageGroup,
    locale: &str,
    doc: &Document,
    resolver: &Resolver,
    config: &SiteConfig,
    base: &str,
) -> SitemapEntry {
    let loc = format!("{base}{}", url_path(&group.key, locale, config));

    let mut alternates: Vec<(String, String)> = group
        .members
        .keys()
        .filter(|&&other| other != locale)
        .map(|&other| {
            (
                other.to_string(),
                format!("{base}{}", url_path(&group.key, other, config)),
            )
        })
        .collect();
    if locale == config.locale.default && group.members.len() > 1 {
        alternates.push(("x-default".to_string(), loc.clone()));
    }

    SitemapEntry {
        loc,
        lastmod: format_ymd(doc.mtime),
        priority: priority(&group.key, locale, config).to_string(),
        alternates,
        images: page_images(doc, resolver, config, base),
    }
}

/// Render entries as a sitemap-protocol XML document.
pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::with_capacity(entries.len() * 256 + 256);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"\n");
    xml.push_str("        xmlns:xhtml=\"http://www.w3.org/1999/xhtml\"\n");
    xml.push_str("        xmlns:image=\"http://www.google.com/schemas/sitemap-image/1.1\">\n");

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod));
        xml.push_str(&format!(
            "    <priority>{}</priority>\n",
            escape_xml(&entry.priority)
        ));
        for (lang, href) in &entry.alternates {
            xml.push_str(&format!(
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                escape_xml(lang),
                escape_xml(href)
            ));
        }
        for image in &entry.images {
            xml.push_str("    <image:image>\n");
            xml.push_str(&format!(
                "      <image:loc>{}</image:loc>\n",
                escape_xml(&image.loc)
            ));
            if let Some(title) = &image.title {
                xml.push_str(&format!(
                    "      <image:title>{}</image:title>\n",
                    escape_xml(title)
                ));
            }
            xml.push_str("    </image:image>\n");
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Render and atomically write the sitemap to `out`.
pub fn write(entries: &[SitemapEntry], out: &Path) -> Result<()> {
    write_atomic(out, render(entries).as_bytes())
}
