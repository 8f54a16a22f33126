//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Static site link, locale, and sitemap maintenance CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file name, looked up inside the site root
    #[arg(short = 'C', long, default_value = "sitecheck.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Audit the tree for broken links, missing assets, and hreflang
    /// violations
    #[command(visible_alias = "a")]
    Audit {
        #[command(flatten)]
        args: AuditArgs,
    },

    /// Rewrite implicit-extension links to their canonical spelling
    #[command(visible_alias = "f")]
    Fix {
        #[command(flatten)]
        args: FixArgs,
    },

    /// Generate the sitemap with locale alternates and image metadata
    #[command(visible_alias = "s")]
    Sitemap {
        #[command(flatten)]
        args: SitemapArgs,
    },
}

/// Audit command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct AuditArgs {
    /// Site root directory (default: current directory)
    #[arg(value_name = "ROOT", value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Check hyperlink targets
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub links: Option<bool>,

    /// Check image and stylesheet asset references
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub assets: Option<bool>,

    /// Check hreflang reciprocity across locale groups
    #[arg(short = 'H', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub hreflang: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Fix command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct FixArgs {
    /// Site root directory (default: current directory)
    #[arg(value_name = "ROOT", value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Report what would change without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Sitemap command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct SitemapArgs {
    /// Site root directory (default: current directory)
    #[arg(value_name = "ROOT", value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Output file (default: sitemap.xml inside the root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Commands {
    /// Site root the command operates on.
    pub fn root(&self) -> PathBuf {
        let root = match self {
            Self::Audit { args } => &args.root,
            Self::Fix { args } => &args.root,
            Self::Sitemap { args } => &args.root,
        };
        root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub const fn verbose(&self) -> bool {
        match self {
            Self::Audit { args } => args.verbose,
            Self::Fix { args } => args.verbose,
            Self::Sitemap { args } => args.verbose,
        }
    }
}
