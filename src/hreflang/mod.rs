//! Hreflang reciprocity validation across locale groups.
//!
//! Within a correspondence group holding locales {L1..Ln}, every member
//! must declare an alternate for every other locale present, every
//! declared alternate must name exactly the group member for that locale,
//! and a declared A→B must be answered by B declaring back to A.
//! Self-referencing declarations are permitted and ignored. Nothing is
//! repaired automatically.

use url::Url;

use crate::config::SiteConfig;
use crate::extract::hreflang_declarations;
use crate::locale::LocaleGraph;
use crate::resolve::Resolver;

/// One reciprocity violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// `source` has no alternate declaration for a locale present in its
    /// group.
    MissingDeclaration { source: String, locale: String },
    /// A declared alternate does not name the group member for its locale.
    DanglingTarget {
        source: String,
        locale: String,
        href: String,
    },
    /// `source` declares `target` as its `locale` alternate, but `target`
    /// never declares back to `source`'s locale.
    Asymmetric {
        source: String,
        target: String,
        locale: String,
    },
}

/// Validate every group of the graph. Issues come out in group-key order,
/// members in locale order, so output is stable across runs.
pub fn validate(graph: &LocaleGraph, resolver: &Resolver, config: &SiteConfig) -> Vec<Issue> {
    let base_host = config
        .base_url()
        .ok()
        .and_then(|u| Url::parse(u).ok())
        .and_then(|u| u.host_str().map(str::to_string));

    let mut issues = Vec::new();

    for group in graph.groups() {
        for (&locale, &doc) in &group.members {
            let declarations = hreflang_declarations(doc.references());

            for (other_locale, &other) in &group.members {
                if *other_locale == locale {
                    continue;
                }
                let declared = declarations
                    .iter()
                    .find(|(lang, _)| lang == other_locale);

                let Some(&(_, href)) = declared else {
                    issues.push(Issue::MissingDeclaration {
                        source: doc.rel.clone(),
                        locale: other_locale.to_string(),
                    });
                    continue;
                };

                if !names_document(href, doc.dir(), other, base_host.as_deref(), resolver) {
                    issues.push(Issue::DanglingTarget {
                        source: doc.rel.clone(),
                        locale: other_locale.to_string(),
                        href: href.to_string(),
                    });
                    continue;
                }

                // Declared and correct; the counterpart must answer back
                // with a declaration that names this document, not merely
                // any page in this locale.
                let back = hreflang_declarations(other.references())
                    .iter()
                    .find(|(lang, _)| *lang == locale)
                    .is_some_and(|&(_, back_href)| {
                        names_document(back_href, other.dir(), doc, base_host.as_deref(), resolver)
                    });
                if !back {
                    issues.push(Issue::Asymmetric {
                        source: doc.rel.clone(),
                        target: other.rel.clone(),
                        locale: locale.to_string(),
                    });
                }
            }
        }
    }

    issues
}

/// Whether a declared href, resolved from `source_dir`, names exactly
/// `expected`.
fn names_document(
    href: &str,
    source_dir: &std::path::Path,
    expected: &crate::site::Document,
    base_host: Option<&str>,
    resolver: &Resolver,
) -> bool {
    local_path(href, base_host)
        .map(|path| resolver.resolve(source_dir, &path))
        .and_then(|res| res.target().map(|t| t == expected.path))
        .unwrap_or(false)
}

/// Reduce an hreflang href to a site-local path the resolver understands.
///
/// Absolute URLs on the configured host (or any host when none is
/// configured) are stripped to their path; foreign hosts yield `None` and
/// count as dangling.
fn local_path(href: &str, base_host: Option<&str>) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => match (url.host_str(), base_host) {
            (Some(host), Some(base)) if host.eq_ignore_ascii_case(base) => {
                Some(url.path().to_string())
            }
            (Some(_), Some(_)) => None,
            (Some(_), None) => Some(url.path().to_string()),
            // scheme without host (mailto: and friends)
            (None, _) => None,
        },
        // relative reference
        Err(_) => Some(href.to_string()),
    }
}
