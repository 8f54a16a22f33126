//! sitecheck - link, locale, and sitemap maintenance for static HTML sites.

#![allow(dead_code)]

mod cli;
mod config;
mod core;
mod extract;
mod fix;
mod hreflang;
mod locale;
mod logger;
mod resolve;
mod site;
mod sitemap;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.command.verbose());

    let config = SiteConfig::load(&cli.command.root(), &cli.config)?;

    match &cli.command {
        Commands::Audit { args } => cli::audit::run_audit(&config, args),
        Commands::Fix { args } => cli::fix::run_fix(&config, args),
        Commands::Sitemap { args } => cli::sitemap::run_sitemap(&config, args),
    }
}
