//! Site configuration management for `sitecheck.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[site]`    | Public URL of the deployed site                  |
//! | `[locale]`  | Default locale and locale-prefix directories     |
//! | `[scan]`    | Ignored directories, index file, page extension  |
//! | `[audit]`   | Which audit checks are enabled                   |
//! | `[sitemap]` | Output path and priority tiers                   |
//!
//! Every tunable the engine needs lives here and is threaded through
//! explicitly; there is no global state. A missing config file falls back
//! to defaults that match a conventional static site layout.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::log;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    Validation(String),
}

/// Root configuration structure representing sitecheck.toml
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root directory (set after load, not from the file)
    #[serde(skip)]
    root: PathBuf,

    pub site: SiteSection,
    pub locale: LocaleSection,
    pub scan: ScanSection,
    pub audit: AuditSection,
    pub sitemap: SitemapSection,
}

/// `[site]` — deployment metadata
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SiteSection {
    /// Public URL the site is served from (e.g. "https://www.example.com").
    /// Required for sitemap emission; audits work without it.
    pub url: Option<String>,
}

/// `[locale]` — locale partition layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocaleSection {
    /// Locale assigned to documents outside any prefix directory.
    pub default: String,
    /// Top-level directory names that are locale partitions ("it" -> it/).
    pub prefixes: Vec<String>,
}

impl Default for LocaleSection {
    fn default() -> Self {
        Self {
            default: "en".into(),
            prefixes: vec!["it".into()],
        }
    }
}

/// `[scan]` — tree walking and resolution rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Directory names pruned from the walk (anywhere in the tree).
    pub ignore: Vec<String>,
    /// Default index document for directory references.
    pub index: String,
    /// Canonical page extension (without dot) for implicit inference.
    pub extension: String,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            ignore: vec![
                ".git".into(),
                "node_modules".into(),
                "scripts".into(),
                "reports".into(),
            ],
            index: "index.html".into(),
            extension: "html".into(),
        }
    }
}

/// `[audit]` — which checks run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    pub links: bool,
    pub assets: bool,
    pub hreflang: bool,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            links: true,
            assets: true,
            hreflang: true,
        }
    }
}

/// `[sitemap]` — output path and priority tiers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapSection {
    /// Output file, relative to the site root.
    pub path: PathBuf,
    /// Top-level section granted the middle priority tier.
    pub section: Option<String>,
    /// Priority for the default-locale home page.
    pub priority_home: String,
    /// Priority for pages under `section`.
    pub priority_section: String,
    /// Priority for everything else.
    pub priority_base: String,
}

impl Default for SitemapSection {
    fn default() -> Self {
        Self {
            path: "sitemap.xml".into(),
            section: None,
            priority_home: "1.0".into(),
            priority_section: "0.9".into(),
            priority_base: "0.8".into(),
        }
    }
}

impl SiteConfig {
    /// Load configuration for a site root.
    ///
    /// Reads `config_name` inside the root if present, otherwise uses
    /// defaults. Unknown fields are warned about, never fatal.
    pub fn load(root: &Path, config_name: &Path) -> Result<Self> {
        let root = normalize_root(root)?;
        let path = root.join(config_name);

        let mut config = if path.is_file() {
            let content = fs::read_to_string(&path)
                .map_err(|err| ConfigError::Io(path.clone(), err))?;
            Self::parse(&content, &path)?
        } else {
            Self::default()
        };

        config.root = root;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, warning on unknown fields.
    fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config: Self =
            serde_ignored::deserialize(deserializer, |field: serde_ignored::Path| {
                ignored.push(field.to_string());
            })
            .map_err(ConfigError::Parse)?;

        if !ignored.is_empty() {
            log!(
                "warning";
                "unknown fields in {}: {}",
                path.display(),
                ignored.join(", ")
            );
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.scan.extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "scan.extension must not start with a dot: {:?}",
                self.scan.extension
            ))
            .into());
        }
        if self.locale.prefixes.iter().any(|p| p.contains('/')) {
            return Err(ConfigError::Validation(
                "locale.prefixes must be single path segments".into(),
            )
            .into());
        }
        Ok(())
    }

    /// Site root directory (absolute).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the site root.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Path relative to the site root, `/`-separated, for display.
    pub fn root_relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let s = rel.to_string_lossy();
        if std::path::MAIN_SEPARATOR == '/' {
            s.into_owned()
        } else {
            s.replace(std::path::MAIN_SEPARATOR, "/")
        }
    }

    /// Public site URL with any trailing slash removed.
    ///
    /// Errors when unset: the sitemap emitter cannot build absolute URLs
    /// without it.
    pub fn base_url(&self) -> Result<&str> {
        self.site
            .url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .context("site.url is not configured (required for sitemap generation)")
    }

    /// Whether a directory name is pruned from the tree walk.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.scan.ignore.iter().any(|d| d == name)
    }

    /// Index file name without its extension ("index").
    pub fn index_stem(&self) -> &str {
        self.scan
            .index
            .strip_suffix(&format!(".{}", self.scan.extension))
            .unwrap_or(&self.scan.index)
    }

    /// Test helper: a config rooted at `root` with default settings.
    #[cfg(test)]
    pub fn for_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }
}

/// Normalize the site root to absolute form.
fn normalize_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize()
        .with_context(|| format!("site root not found: {}", root.display()))
}
