//! Sitemap generation command.

use anyhow::{Context, Result};

use crate::cli::SitemapArgs;
use crate::config::SiteConfig;
use crate::locale::LocaleGraph;
use crate::log;
use crate::resolve::{DiskVfs, Resolver};
use crate::site;
use crate::sitemap;

/// Build and write the sitemap for a site tree.
pub fn run_sitemap(config: &SiteConfig, args: &SitemapArgs) -> Result<()> {
    let scan = site::scan(config)?;
    for (rel, err) in &scan.failures {
        log!("warning"; "skipping {rel}: {err}");
    }

    let graph = LocaleGraph::build(&scan.documents, config);
    for c in &graph.collisions {
        log!(
            "warning";
            "locale collision on `{}`: `{}` vs `{}` (group excluded)",
            c.key, c.kept, c.dropped
        );
    }

    let vfs = DiskVfs;
    let resolver = Resolver::new(config, &vfs);
    let entries = sitemap::build_entries(&graph, &resolver, config)?;

    let out = match &args.output {
        Some(path) => path.clone(),
        None => config.root_join(&config.sitemap.path),
    };
    sitemap::write(&entries, &out)
        .with_context(|| format!("failed to write sitemap to {}", out.display()))?;

    log!(
        "sitemap";
        "wrote {} entr{} to {}",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" },
        out.display()
    );
    Ok(())
}
