//! Command-line interface module.

mod args;
pub mod audit;
pub mod fix;
pub mod report;
pub mod sitemap;

pub use args::{AuditArgs, Cli, Commands, FixArgs, SitemapArgs};
