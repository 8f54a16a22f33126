//! Site audit command.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use rayon::prelude::*;

use crate::cli::AuditArgs;
use crate::cli::report::{AuditReport, Finding};
use crate::config::SiteConfig;
use crate::core::RefKind;
use crate::hreflang::{self, Issue};
use crate::locale::LocaleGraph;
use crate::log;
use crate::resolve::{DiskVfs, Resolution, Resolver};
use crate::site;
use crate::utils::{plural_count, plural_s};

/// Audit the site tree for broken links, missing assets, hreflang
/// violations, locale collisions, and leftover placeholders.
pub fn run_audit(config: &SiteConfig, args: &AuditArgs) -> Result<()> {
    let check_links = args.links.unwrap_or(config.audit.links);
    let check_assets = args.assets.unwrap_or(config.audit.assets);
    let check_hreflang = args.hreflang.unwrap_or(config.audit.hreflang);

    if !check_links && !check_assets && !check_hreflang {
        log!("audit"; "no checks enabled");
        return Ok(());
    }

    let scan = site::scan(config)?;
    if scan.documents.is_empty() && scan.failures.is_empty() {
        log!("audit"; "no pages found");
        return Ok(());
    }
    log!("audit"; "checking {}", plural_count(scan.documents.len(), "page"));

    let report = Arc::new(RwLock::new(AuditReport::default()));
    for (rel, err) in &scan.failures {
        report.write().add_io(rel.clone(), err.clone());
    }

    let vfs = DiskVfs;
    let resolver = Resolver::new(config, &vfs);

    // Read phase: resolve every reference of every page in parallel.
    scan.documents.par_iter().for_each(|doc| {
        audit_document(doc, &resolver, &report, check_links, check_assets);
    });

    let graph = LocaleGraph::build(&scan.documents, config);
    for c in &graph.collisions {
        report.write().add_locale(
            c.kept.clone(),
            format!("`{}`", c.dropped),
            format!("both occupy locale key `{}` for `{}`", c.key, c.locale),
        );
    }

    if check_hreflang {
        for issue in hreflang::validate(&graph, &resolver, config) {
            let (source, target, reason) = describe(issue);
            report.write().add_hreflang(source, target, reason);
        }
    }

    let report = Arc::try_unwrap(report).unwrap().into_inner();
    log_results(&report, &scan, check_links, check_assets, check_hreflang);
    report.print();

    if report.is_empty() {
        log!("audit"; "{}", report);
        Ok(())
    } else {
        let total = report.total();
        anyhow::bail!("audit failed: {} finding{}", total, plural_s(total))
    }
}

fn audit_document(
    doc: &site::Document,
    resolver: &Resolver,
    report: &Arc<RwLock<AuditReport>>,
    check_links: bool,
    check_assets: bool,
) {
    for r in doc.references() {
        // Hreflang declarations are checked by the reciprocity validator,
        // not reference by reference.
        if r.kind == RefKind::Hreflang {
            continue;
        }
        if r.is_placeholder() {
            report
                .write()
                .add_placeholder(doc.rel.clone(), format!("`{}` (line {})", r.raw, r.line));
            continue;
        }
        let enabled = if r.kind.is_asset() {
            check_assets
        } else {
            check_links
        };
        if !enabled {
            continue;
        }

        if let Resolution::Unresolved { .. } = resolver.resolve(doc.dir(), &r.raw) {
            let target = format!("`{}`", r.raw);
            let reason = format!("not found (line {})", r.line);
            if r.kind.is_asset() {
                report.write().add_asset(doc.rel.clone(), target, reason);
            } else {
                report.write().add_link(doc.rel.clone(), target, reason);
            }
        }
    }
}

fn describe(issue: Issue) -> (String, String, String) {
    match issue {
        Issue::MissingDeclaration { source, locale } => (
            source,
            format!("hreflang=\"{locale}\""),
            "missing declaration".to_string(),
        ),
        Issue::DanglingTarget {
            source,
            locale,
            href,
        } => (
            source,
            format!("`{href}`"),
            format!("does not name the `{locale}` counterpart"),
        ),
        Issue::Asymmetric {
            source,
            target,
            locale,
        } => (
            source,
            format!("`{target}`"),
            format!("never declares back to `{locale}`"),
        ),
    }
}

fn log_results(
    report: &AuditReport,
    scan: &site::Scan,
    check_links: bool,
    check_assets: bool,
    check_hreflang: bool,
) {
    fn count(s: &std::collections::BTreeMap<String, Vec<Finding>>) -> usize {
        s.values().map(Vec::len).sum()
    }

    if check_links {
        match count(&report.links) {
            0 => log!("audit"; "all page links valid"),
            n => log!("audit"; "found {} broken page link{}", n, plural_s(n)),
        }
    }
    if check_assets {
        match count(&report.assets) {
            0 => log!("audit"; "all asset references valid"),
            n => log!("audit"; "found {} missing asset{}", n, plural_s(n)),
        }
    }
    if check_hreflang {
        match count(&report.hreflang) {
            0 => log!("audit"; "hreflang declarations reciprocal"),
            n => log!("audit"; "found {} hreflang violation{}", n, plural_s(n)),
        }
    }
    if !scan.failures.is_empty() {
        log!(
            "audit";
            "checked {}, {} unreadable",
            plural_count(scan.documents.len(), "page"),
            scan.failures.len()
        );
    }
}
