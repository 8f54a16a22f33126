//! Site tree scanning and the in-memory document model.
//!
//! The read phase walks the tree once, loads every page into memory and
//! never touches the filesystem for content again. Reference extraction is
//! lazy per document and cached, so commands that only need a subset of
//! documents do not pay for the rest.

use anyhow::Result;
use jwalk::WalkDir;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use crate::config::SiteConfig;
use crate::core::Reference;
use crate::debug;
use crate::extract;

/// One HTML page loaded from the site tree. Immutable for the duration of
/// a run.
pub struct Document {
    /// Absolute filesystem path.
    pub path: PathBuf,
    /// Root-relative `/`-separated path, for display and locale keying.
    pub rel: String,
    /// Locale code derived from the path prefix.
    pub locale: String,
    /// Raw file content.
    pub text: String,
    /// Modification time at read.
    pub mtime: SystemTime,

    refs: OnceLock<Vec<Reference>>,
}

impl Document {
    pub fn new(
        path: PathBuf,
        rel: String,
        locale: String,
        text: String,
        mtime: SystemTime,
    ) -> Self {
        Self {
            path,
            rel,
            locale,
            text,
            mtime,
            refs: OnceLock::new(),
        }
    }

    /// Extracted references, computed on first use.
    pub fn references(&self) -> &[Reference] {
        self.refs
            .get_or_init(|| extract::extract_references(&self.text))
    }

    /// Directory containing the document; resolution base for relative
    /// references.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("/"))
    }

    /// Whether a robots meta tag opts this page out of indexing.
    pub fn noindex(&self) -> bool {
        extract::has_noindex(&self.text)
    }
}

/// Result of the read phase.
pub struct Scan {
    /// Successfully loaded documents, sorted by root-relative path.
    pub documents: Vec<Document>,
    /// Pages that could not be read or decoded, with the failure message.
    pub failures: Vec<(String, String)>,
}

/// Walk the site tree and load every page in parallel.
///
/// Ignored directories are pruned by name anywhere in the tree. Unreadable
/// or non-UTF-8 pages land in `failures` and never abort the scan, and so
/// do directories the walk itself cannot enter.
pub fn scan(config: &SiteConfig) -> Result<Scan> {
    let page_suffix = format!(".{}", config.scan.extension);

    let mut paths = Vec::new();
    let mut failures: Vec<(String, String)> = Vec::new();
    for entry in WalkDir::new(config.root()) {
        match entry {
            Ok(e) => {
                if e.file_type().is_file() {
                    paths.push(e.path());
                }
            }
            Err(err) => {
                let rel = err
                    .path()
                    .map(|p| config.root_relative(p))
                    .unwrap_or_else(|| config.root_relative(config.root()));
                failures.push((rel, err.to_string()));
            }
        }
    }
    paths.retain(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&page_suffix))
            && !in_ignored_dir(p, config)
    });
    paths.sort();

    debug!("scan"; "found {} page(s) under {}", paths.len(), config.root().display());

    let results: Vec<std::result::Result<Document, (String, String)>> = paths
        .par_iter()
        .map(|path| load_document(path, config))
        .collect();

    let mut documents = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(doc) => documents.push(doc),
            Err(failure) => failures.push(failure),
        }
    }
    Ok(Scan {
        documents,
        failures,
    })
}

fn load_document(
    path: &Path,
    config: &SiteConfig,
) -> std::result::Result<Document, (String, String)> {
    let rel = config.root_relative(path);
    let fail = |err: String| (rel.clone(), err);

    let text = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
    let mtime = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| fail(e.to_string()))?;
    let locale = locale_of(&rel, config).to_string();

    Ok(Document::new(path.to_path_buf(), rel, locale, text, mtime))
}

/// Locale of a root-relative path: its first segment when that segment is
/// a configured locale prefix, otherwise the default locale.
pub fn locale_of<'c>(rel: &str, config: &'c SiteConfig) -> &'c str {
    let first = rel.split('/').next().unwrap_or_default();
    config
        .locale
        .prefixes
        .iter()
        .find(|p| p.as_str() == first)
        .map(String::as_str)
        .unwrap_or(&config.locale.default)
}

fn in_ignored_dir(path: &Path, config: &SiteConfig) -> bool {
    path.strip_prefix(config.root())
        .unwrap_or(path)
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .any(|name| config.is_ignored_dir(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_collects_pages_and_locales() {
        let dir = TempDir::new().unwrap();
        write(&dir, "index.html", "<html></html>");
        write(&dir, "it/index.html", "<html></html>");
        write(&dir, "spring/menu.html", "<html></html>");
        write(&dir, "assets/style.css", "body {}");
        write(&dir, "node_modules/pkg/index.html", "<html></html>");

        let config = SiteConfig::load(dir.path(), Path::new("sitecheck.toml")).unwrap();
        let scan = scan(&config).unwrap();

        let rels: Vec<_> = scan.documents.iter().map(|d| d.rel.as_str()).collect();
        assert_eq!(rels, ["index.html", "it/index.html", "spring/menu.html"]);
        assert!(scan.failures.is_empty());

        assert_eq!(scan.documents[0].locale, "en");
        assert_eq!(scan.documents[1].locale, "it");
        assert_eq!(scan.documents[2].locale, "en");
    }

    #[test]
    fn test_invalid_utf8_is_a_failure_not_an_abort() {
        let dir = TempDir::new().unwrap();
        write(&dir, "good.html", "<html></html>");
        fs::write(dir.path().join("bad.html"), [0xff, 0xfe, 0x00]).unwrap();

        let config = SiteConfig::load(dir.path(), Path::new("sitecheck.toml")).unwrap();
        let scan = scan(&config).unwrap();

        assert_eq!(scan.documents.len(), 1);
        assert_eq!(scan.documents[0].rel, "good.html");
        assert_eq!(scan.failures.len(), 1);
        assert_eq!(scan.failures[0].0, "bad.html");
    }

    #[test]
    #[cfg(unix)]
    fn test_unenterable_directory_is_a_failure_not_an_abort() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(&dir, "good.html", "<html></html>");
        write(&dir, "private/hidden.html", "<html></html>");

        let locked = dir.path().join("private");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Mode bits do not bind root; only expect the failure when the
        // directory really is unenterable.
        let denied = fs::read_dir(&locked).is_err();

        let config = SiteConfig::load(dir.path(), Path::new("sitecheck.toml")).unwrap();
        let result = scan(&config);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let scan = result.unwrap();
        assert!(scan.documents.iter().any(|d| d.rel == "good.html"));
        if denied {
            assert!(
                scan.failures
                    .iter()
                    .any(|(rel, _)| rel.starts_with("private")),
                "{:?}",
                scan.failures
            );
        }
    }

    #[test]
    fn test_locale_of() {
        let config = SiteConfig::default();
        assert_eq!(locale_of("index.html", &config), "en");
        assert_eq!(locale_of("it/about.html", &config), "it");
        assert_eq!(locale_of("italy-guide/about.html", &config), "en");
    }

    #[test]
    fn test_references_cached() {
        let dir = TempDir::new().unwrap();
        write(&dir, "page.html", r#"<a href="/about.html">x</a>"#);
        let config = SiteConfig::load(dir.path(), Path::new("sitecheck.toml")).unwrap();
        let scan = scan(&config).unwrap();

        let doc = &scan.documents[0];
        let first = doc.references().as_ptr();
        let second = doc.references().as_ptr();
        assert_eq!(first, second);
        assert_eq!(doc.references().len(), 1);
    }
}
