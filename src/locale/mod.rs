//! Locale correspondence: grouping documents across locale partitions.
//!
//! Two documents correspond when they occupy the same position in their
//! respective partitions: `about.html` and `it/about.html` are the same
//! page in two languages. The shared position is the locale key, the
//! root-relative path with the locale prefix and the page extension
//! stripped.

use std::collections::BTreeMap;

use crate::config::SiteConfig;
use crate::site::Document;

/// Locale key of a root-relative page path.
///
/// `it/about.html` and `about.html` both map to `about`; `it/index.html`
/// and `index.html` both map to `index`.
pub fn locale_key(rel: &str, config: &SiteConfig) -> String {
    let stripped = config
        .locale
        .prefixes
        .iter()
        .find_map(|p| rel.strip_prefix(&format!("{p}/")))
        .unwrap_or(rel);
    stripped
        .strip_suffix(&format!(".{}", config.scan.extension))
        .unwrap_or(stripped)
        .to_string()
}

/// Documents sharing one locale key, at most one per locale.
pub struct PageGroup<'a> {
    pub key: String,
    /// Locale code to document, ordered by locale code.
    pub members: BTreeMap<&'a str, &'a Document>,
    /// A (key, locale) collision occurred; the group is excluded from
    /// sitemap emission.
    pub poisoned: bool,
}

/// Two documents claimed the same (locale key, locale) slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub key: String,
    pub locale: String,
    pub kept: String,
    pub dropped: String,
}

/// The full correspondence structure of a site.
pub struct LocaleGraph<'a> {
    groups: BTreeMap<String, PageGroup<'a>>,
    pub collisions: Vec<Collision>,
}

impl<'a> LocaleGraph<'a> {
    /// Group documents by locale key. Documents are expected sorted by
    /// root-relative path, so collisions keep the first-seen member
    /// deterministically.
    pub fn build(documents: &'a [Document], config: &SiteConfig) -> Self {
        let mut groups: BTreeMap<String, PageGroup<'a>> = BTreeMap::new();
        let mut collisions = Vec::new();

        for doc in documents {
            let key = locale_key(&doc.rel, config);
            let group = groups.entry(key.clone()).or_insert_with(|| PageGroup {
                key: key.clone(),
                members: BTreeMap::new(),
                poisoned: false,
            });
            if let Some(existing) = group.members.get(doc.locale.as_str()) {
                group.poisoned = true;
                collisions.push(Collision {
                    key,
                    locale: doc.locale.clone(),
                    kept: existing.rel.clone(),
                    dropped: doc.rel.clone(),
                });
            } else {
                group.members.insert(&doc.locale, doc);
            }
        }

        Self { groups, collisions }
    }

    /// Groups in locale-key order.
    pub fn groups(&self) -> impl Iterator<Item = &PageGroup<'a>> {
        self.groups.values()
    }

    /// The group member for a given locale key and locale, if any.
    pub fn member(&self, key: &str, locale: &str) -> Option<&'a Document> {
        self.groups.get(key).and_then(|g| g.members.get(locale)).copied()
    }
}
