//! Reference fixing command.
//!
//! Two strict phases: every document is scanned and its rewrites computed
//! in parallel while the tree is read-only, then changed documents are
//! written back one by one. A write failure on one file is reported and
//! does not stop the rest.

use anyhow::Result;
use rayon::prelude::*;

use crate::cli::FixArgs;
use crate::config::SiteConfig;
use crate::fix::{Rewrite, rewrite_references};
use crate::resolve::{DiskVfs, Resolver};
use crate::site;
use crate::utils::fsx::write_atomic;
use crate::utils::{plural_count, plural_s};
use crate::{debug, log};

struct PendingFix {
    rel: String,
    path: std::path::PathBuf,
    new_text: String,
    rewrites: Vec<Rewrite>,
}

/// Rewrite implicit-extension links across the whole tree.
pub fn run_fix(config: &SiteConfig, args: &FixArgs) -> Result<()> {
    let scan = site::scan(config)?;
    log!("fix"; "scanning {}", plural_count(scan.documents.len(), "page"));

    for (rel, err) in &scan.failures {
        log!("warning"; "skipping {rel}: {err}");
    }

    let vfs = DiskVfs;
    let resolver = Resolver::new(config, &vfs);
    let extension = config.scan.extension.as_str();

    // Read phase: compute every rewrite against the untouched tree.
    let pending: Vec<PendingFix> = scan
        .documents
        .par_iter()
        .filter_map(|doc| {
            let (new_text, rewrites) =
                rewrite_references(&doc.text, doc.dir(), &resolver, extension);
            if rewrites.is_empty() {
                return None;
            }
            Some(PendingFix {
                rel: doc.rel.clone(),
                path: doc.path.clone(),
                new_text: new_text.into_owned(),
                rewrites,
            })
        })
        .collect();

    if pending.is_empty() {
        log!("fix"; "nothing to rewrite");
        return Ok(());
    }

    // Write phase.
    let mut changed = 0usize;
    let mut rewritten = 0usize;
    let mut write_failures = 0usize;
    for fix in &pending {
        for r in &fix.rewrites {
            debug!("fix"; "{}: `{}` -> `{}`", fix.rel, r.old, r.new);
        }
        if args.dry_run {
            log!("fix"; "would rewrite {} in {}", plural_count(fix.rewrites.len(), "reference"), fix.rel);
            continue;
        }
        match write_atomic(&fix.path, fix.new_text.as_bytes()) {
            Ok(()) => {
                log!("fix"; "rewrote {} in {}", plural_count(fix.rewrites.len(), "reference"), fix.rel);
                changed += 1;
                rewritten += fix.rewrites.len();
            }
            Err(err) => {
                log!("error"; "failed to write {}: {err:#}", fix.rel);
                write_failures += 1;
            }
        }
    }

    if args.dry_run {
        let total: usize = pending.iter().map(|f| f.rewrites.len()).sum();
        log!(
            "fix";
            "dry run: {} in {} would change",
            plural_count(total, "reference"),
            plural_count(pending.len(), "file")
        );
        return Ok(());
    }

    log!(
        "fix";
        "rewrote {} in {}",
        plural_count(rewritten, "reference"),
        plural_count(changed, "file")
    );
    if write_failures > 0 {
        anyhow::bail!(
            "fix failed: {} file{} could not be written",
            write_failures,
            plural_s(write_failures)
        );
    }
    Ok(())
}
