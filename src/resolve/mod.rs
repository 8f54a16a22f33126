//! Reference resolution against the site tree.
//!
//! This is the single shared algorithm used by the audit reporter, the
//! fixer, and the sitemap emitter. One implementation, injected
//! everywhere, so read-only and mutating consumers can never disagree on
//! what a reference points at.
//!
//! Resolution order (first match wins):
//!
//! 1. classify: external schemes, protocol-relative links, bare fragments
//!    and placeholder raws are skipped without any filesystem access;
//! 2. strip `#fragment` / `?query` suffixes (the raw string is kept by the
//!    caller for reporting);
//! 3. leading `/` resolves against the site root, anything else against
//!    the source document's directory;
//! 4. lexical normalization of `.` and `..` segments;
//! 5. existence cascade: exact file, directory with an index document,
//!    path plus the canonical extension; otherwise unresolved. A real
//!    directory without an index stops the cascade: extension inference
//!    is never attempted for a spelling that names a directory.

mod vfs;

pub use vfs::{DiskVfs, MemoryVfs, Vfs};

use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::core::LinkScope;
use crate::utils::url::{decode_percent, strip_suffixes};

/// Which rule of the existence cascade succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The normalized path exists as a regular file.
    Exact,
    /// The normalized path is a directory containing the index document.
    DirectoryIndex,
    /// The path with the canonical extension appended exists.
    ImplicitExtension,
}

/// Why a reference was skipped without filesystem access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// http(s), protocol-relative, mailto:, tel:, javascript:, data:, ...
    External,
    /// Bare in-page fragment (`#...`).
    Fragment,
    /// Unexpanded template placeholder (literal braces).
    Placeholder,
    /// Nothing left after stripping fragment/query (`?page=2`).
    Empty,
    /// Empty attribute value.
    Blank,
}

/// Outcome of resolving one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Target found.
    Resolved {
        /// Normalized absolute path of the target file.
        path: PathBuf,
        strategy: Strategy,
    },
    /// No file, no directory index, no implicit-extension candidate.
    Unresolved {
        /// The normalized candidate path, for diagnostics.
        candidate: PathBuf,
    },
    /// Out of scope; the filesystem was never consulted.
    Skipped(SkipReason),
}

impl Resolution {
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// The resolved target path, if any.
    pub fn target(&self) -> Option<&Path> {
        match self {
            Self::Resolved { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// The shared resolver. Pure and deterministic for a given [`Vfs`]
/// snapshot.
pub struct Resolver<'a> {
    root: &'a Path,
    vfs: &'a dyn Vfs,
    index_file: &'a str,
    extension: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a SiteConfig, vfs: &'a dyn Vfs) -> Self {
        Self {
            root: config.root(),
            vfs,
            index_file: &config.scan.index,
            extension: &config.scan.extension,
        }
    }

    /// Resolver over an explicit root, for callers without a full config.
    pub fn with_root(root: &'a Path, vfs: &'a dyn Vfs, index_file: &'a str, extension: &'a str) -> Self {
        Self {
            root,
            vfs,
            index_file,
            extension,
        }
    }

    /// Resolve a raw reference found in a document under `source_dir`.
    pub fn resolve(&self, source_dir: &Path, raw: &str) -> Resolution {
        if raw.is_empty() {
            return Resolution::Skipped(SkipReason::Blank);
        }
        if raw.contains(['{', '}']) {
            return Resolution::Skipped(SkipReason::Placeholder);
        }

        let path_part = match LinkScope::classify(raw) {
            LinkScope::External => return Resolution::Skipped(SkipReason::External),
            LinkScope::InPage => return Resolution::Skipped(SkipReason::Fragment),
            LinkScope::Rooted | LinkScope::Relative => strip_suffixes(raw),
        };
        if path_part.is_empty() {
            return Resolution::Skipped(SkipReason::Empty);
        }

        let decoded = decode_percent(path_part);
        let candidate = if let Some(rooted) = decoded.strip_prefix('/') {
            normalize_join(self.root, rooted)
        } else {
            normalize_join(source_dir, &decoded)
        };

        // (i) exact file
        if self.vfs.is_file(&candidate) {
            return Resolution::Resolved {
                path: candidate,
                strategy: Strategy::Exact,
            };
        }

        // (ii) directory with an index document. An existing directory
        // without one is ambiguous: the spelling names a real directory,
        // so extension inference must not kick in for it.
        if self.vfs.is_dir(&candidate) {
            let index = candidate.join(self.index_file);
            if self.vfs.is_file(&index) {
                return Resolution::Resolved {
                    path: index,
                    strategy: Strategy::DirectoryIndex,
                };
            }
            return Resolution::Unresolved { candidate };
        }

        // (iii) implicit extension. A trailing slash means the author meant
        // a directory; appending ".html" to that would resolve the wrong
        // thing.
        if !decoded.ends_with('/') && !self.has_canonical_extension(&candidate) {
            let with_ext = append_extension(&candidate, self.extension);
            if self.vfs.is_file(&with_ext) {
                return Resolution::Resolved {
                    path: with_ext,
                    strategy: Strategy::ImplicitExtension,
                };
            }
        }

        Resolution::Unresolved { candidate }
    }

    fn has_canonical_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.extension))
    }
}

/// Join `rel` onto `base`, collapsing `.` and `..` lexically.
///
/// `..` at the top of `base` pops toward the filesystem root and stops
/// there, matching what a path normalization pass would produce. Escaping
/// the site root is allowed; such candidates simply fail the existence
/// cascade.
fn normalize_join(base: &Path, rel: &str) -> PathBuf {
    let mut result = base.to_path_buf();
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                result.pop();
            }
            _ => result.push(part),
        }
    }
    result
}

/// Append `.ext` to the final component without touching existing dots
/// (`team.v2` becomes `team.v2.html`, not `team.html`).
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.to_path_buf().into_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Vfs wrapper that counts lookups, to prove skipped references never
    /// touch the filesystem.
    struct CountingVfs<'a> {
        inner: &'a MemoryVfs,
        lookups: AtomicUsize,
    }

    impl<'a> CountingVfs<'a> {
        fn new(inner: &'a MemoryVfs) -> Self {
            Self {
                inner,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl Vfs for CountingVfs<'_> {
        fn is_file(&self, path: &Path) -> bool {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.is_file(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.is_dir(path)
        }
    }

    fn site_vfs() -> MemoryVfs {
        let mut vfs = MemoryVfs::new();
        vfs.add_file("/site/index.html");
        vfs.add_file("/site/about.html");
        vfs.add_file("/site/team.html");
        vfs.add_file("/site/team.v2.html");
        vfs.add_file("/site/spring/index.html");
        vfs.add_file("/site/assets/logo.png");
        vfs.add_file("/site/it/index.html");
        vfs.add_file("/site/it/about.html");
        vfs.add_file("/site/my file.html");
        vfs
    }

    fn resolver<'a>(vfs: &'a dyn Vfs) -> Resolver<'a> {
        Resolver::with_root(Path::new("/site"), vfs, "index.html", "html")
    }

    #[test]
    fn test_skipped_never_touches_vfs() {
        let mem = site_vfs();
        let counting = CountingVfs::new(&mem);
        let r = resolver(&counting);
        let dir = Path::new("/site");

        for raw in [
            "https://example.com/page",
            "http://example.com",
            "//cdn.example.com/lib.js",
            "mailto:hi@example.com",
            "tel:+391234567",
            "javascript:void(0)",
            "data:image/png;base64,AAAA",
            "#contact",
            "#",
            "{{ base_url }}/about",
            "?page=2",
            "",
        ] {
            assert!(
                matches!(r.resolve(dir, raw), Resolution::Skipped(_)),
                "expected skip for {raw:?}"
            );
        }
        assert_eq!(counting.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exact_match() {
        let vfs = site_vfs();
        let r = resolver(&vfs);
        assert_eq!(
            r.resolve(Path::new("/site"), "about.html"),
            Resolution::Resolved {
                path: "/site/about.html".into(),
                strategy: Strategy::Exact
            }
        );
    }

    #[test]
    fn test_directory_index() {
        let vfs = site_vfs();
        let r = resolver(&vfs);
        for raw in ["/spring/", "/spring", "spring/"] {
            assert_eq!(
                r.resolve(Path::new("/site"), raw),
                Resolution::Resolved {
                    path: "/site/spring/index.html".into(),
                    strategy: Strategy::DirectoryIndex
                },
                "raw {raw:?}"
            );
        }
    }

    #[test]
    fn test_implicit_extension() {
        let vfs = site_vfs();
        let r = resolver(&vfs);
        assert_eq!(
            r.resolve(Path::new("/site"), "team"),
            Resolution::Resolved {
                path: "/site/team.html".into(),
                strategy: Strategy::ImplicitExtension
            }
        );
        // Existing dots in the stem are preserved
        assert_eq!(
            r.resolve(Path::new("/site"), "team.v2"),
            Resolution::Resolved {
                path: "/site/team.v2.html".into(),
                strategy: Strategy::ImplicitExtension
            }
        );
    }

    #[test]
    fn test_path_equivalence_relative_vs_rooted() {
        // A ../-relative spelling and the root-relative spelling of the
        // same location must resolve identically.
        let vfs = site_vfs();
        let r = resolver(&vfs);
        let from_it = r.resolve(Path::new("/site/it"), "../about.html");
        let rooted = r.resolve(Path::new("/site/it"), "/about.html");
        assert_eq!(from_it, rooted);
        assert_eq!(from_it.target(), Some(Path::new("/site/about.html")));
    }

    #[test]
    fn test_fragment_and_query_stripped() {
        let vfs = site_vfs();
        let r = resolver(&vfs);
        for raw in ["about.html#team", "about.html?ref=nav", "about#x?y=1"] {
            assert!(
                r.resolve(Path::new("/site"), raw).is_resolved(),
                "raw {raw:?}"
            );
        }
    }

    #[test]
    fn test_percent_decoding() {
        let vfs = site_vfs();
        let r = resolver(&vfs);
        assert!(r.resolve(Path::new("/site"), "my%20file.html").is_resolved());
    }

    #[test]
    fn test_unresolved_carries_candidate() {
        let vfs = site_vfs();
        let r = resolver(&vfs);
        match r.resolve(Path::new("/site"), "/assets/missing.png") {
            Resolution::Unresolved { candidate } => {
                assert_eq!(candidate, PathBuf::from("/site/assets/missing.png"));
            }
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[test]
    fn test_dir_without_index_is_unresolved() {
        let mut vfs = MemoryVfs::new();
        vfs.add_file("/site/docs/readme.txt");
        let r = resolver(&vfs);
        assert!(matches!(
            r.resolve(Path::new("/site"), "docs/"),
            Resolution::Unresolved { .. }
        ));
    }

    #[test]
    fn test_directory_shadows_implicit_extension() {
        // Both team/ (no index) and team.html exist. The spelling names
        // the directory, so the cascade must stop at unresolved instead
        // of inferring team.html.
        let mut vfs = MemoryVfs::new();
        vfs.add_file("/site/team/notes.txt");
        vfs.add_file("/site/team.html");
        let r = resolver(&vfs);
        assert!(matches!(
            r.resolve(Path::new("/site"), "team"),
            Resolution::Unresolved { .. }
        ));
    }

    #[test]
    fn test_normalize_join() {
        assert_eq!(
            normalize_join(Path::new("/site/it"), "../assets/logo.png"),
            PathBuf::from("/site/assets/logo.png")
        );
        assert_eq!(
            normalize_join(Path::new("/site"), "./a/./b"),
            PathBuf::from("/site/a/b")
        );
        // Climbing past the filesystem root clamps
        assert_eq!(
            normalize_join(Path::new("/site"), "../../../x"),
            PathBuf::from("/x")
        );
    }

    #[test]
    fn test_trailing_slash_never_infers_extension() {
        let vfs = site_vfs();
        let r = resolver(&vfs);
        // team/ is not a directory; team.html exists but the trailing
        // slash means the author meant a directory
        assert!(matches!(
            r.resolve(Path::new("/site"), "team/"),
            Resolution::Unresolved { .. }
        ));
    }
}
