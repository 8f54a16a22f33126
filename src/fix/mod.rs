//! Canonical-spelling rewriter for hyperlink references.
//!
//! A reference that only resolves through implicit-extension inference
//! (`team` for `team.html`) works on the filesystem preview but 404s on
//! strict static hosting. The fixer rewrites such references to carry the
//! extension, splicing it in before any `#fragment` or `?query` suffix,
//! and leaves every other byte of the document untouched. Running it twice
//! changes nothing the second time.

use anyhow::Result;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use crate::resolve::{Resolution, Resolver, Strategy};
use crate::site::Document;
use crate::utils::fsx::write_atomic;
use crate::utils::url::split_suffixes;

// The leading guard keeps `data-href` and friends out; `\b` alone treats
// the `-` as a boundary and would match them.
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(^|[^-\w])(href\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// One applied rewrite, for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub old: String,
    pub new: String,
}

/// Rewrite every implicit-extension href in `text`. Returns the new text
/// (borrowed when nothing changed) and the list of rewrites applied.
pub fn rewrite_references<'t>(
    text: &'t str,
    source_dir: &Path,
    resolver: &Resolver,
    extension: &str,
) -> (Cow<'t, str>, Vec<Rewrite>) {
    let mut rewrites = Vec::new();

    let result = HREF.replace_all(text, |caps: &Captures| {
        let pre = &caps[1];
        let prefix = &caps[2];
        let (quote, raw) = match (caps.get(3), caps.get(4)) {
            (Some(m), _) => ('"', m.as_str()),
            (_, Some(m)) => ('\'', m.as_str()),
            _ => unreachable!(),
        };

        let fixed = canonical_spelling(raw, source_dir, resolver, extension);
        let value = match fixed {
            Some(new) => {
                rewrites.push(Rewrite {
                    old: raw.to_string(),
                    new: new.clone(),
                });
                new
            }
            None => raw.to_string(),
        };
        format!("{pre}{prefix}{quote}{value}{quote}")
    });

    (result, rewrites)
}

/// The canonical spelling of a raw reference, or `None` when it is already
/// canonical (or out of scope).
fn canonical_spelling(
    raw: &str,
    source_dir: &Path,
    resolver: &Resolver,
    extension: &str,
) -> Option<String> {
    match resolver.resolve(source_dir, raw) {
        Resolution::Resolved {
            strategy: Strategy::ImplicitExtension,
            ..
        } => {
            let (path_part, suffix) = split_suffixes(raw);
            Some(format!("{path_part}.{extension}{suffix}"))
        }
        _ => None,
    }
}

/// Fix one document in place. Returns the rewrites that were (or, under
/// `dry_run`, would have been) applied; the file is only rewritten when
/// something changed.
pub fn fix_document(
    doc: &Document,
    resolver: &Resolver,
    extension: &str,
    dry_run: bool,
) -> Result<Vec<Rewrite>> {
    let (new_text, rewrites) = rewrite_references(&doc.text, doc.dir(), resolver, extension);
    if !rewrites.is_empty() && !dry_run {
        write_atomic(&doc.path, new_text.as_bytes())?;
    }
    Ok(rewrites)
}
