//! Audit findings report and formatting.

use std::collections::BTreeMap;
use std::fmt;

use owo_colors::OwoColorize;

use crate::utils::plural_s;

/// A single finding
#[derive(Debug, Clone)]
pub struct Finding {
    /// The reference/path involved.
    pub target: String,
    /// Reason/message.
    pub reason: String,
}

type Section = BTreeMap<String, Vec<Finding>>;

/// Findings grouped by check, then by source file
#[derive(Debug, Default)]
pub struct AuditReport {
    /// Broken hyperlink targets.
    pub links: Section,
    /// Missing image/stylesheet assets.
    pub assets: Section,
    /// Hreflang reciprocity violations.
    pub hreflang: Section,
    /// Locale-key collisions.
    pub locale: Section,
    /// Unexpanded template placeholders.
    pub placeholders: Section,
    /// Files that could not be read or written.
    pub io: Section,
}

impl AuditReport {
    pub fn add_link(&mut self, source: String, target: String, reason: String) {
        add(&mut self.links, source, target, reason);
    }

    pub fn add_asset(&mut self, source: String, target: String, reason: String) {
        add(&mut self.assets, source, target, reason);
    }

    pub fn add_hreflang(&mut self, source: String, target: String, reason: String) {
        add(&mut self.hreflang, source, target, reason);
    }

    pub fn add_locale(&mut self, source: String, target: String, reason: String) {
        add(&mut self.locale, source, target, reason);
    }

    pub fn add_placeholder(&mut self, source: String, target: String) {
        add(&mut self.placeholders, source, target, String::new());
    }

    pub fn add_io(&mut self, source: String, reason: String) {
        add(&mut self.io, source, String::new(), reason);
    }

    /// Total finding count across every section.
    pub fn total(&self) -> usize {
        self.sections().map(|(_, s)| count(s)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn sections(&self) -> impl Iterator<Item = (&'static str, &Section)> {
        [
            ("links", &self.links),
            ("assets", &self.assets),
            ("hreflang", &self.hreflang),
            ("locale", &self.locale),
            ("placeholders", &self.placeholders),
            ("io", &self.io),
        ]
        .into_iter()
    }

    /// Render the full report, section by section.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, section) in self.sections() {
            render_section(&mut out, name, section);
        }
        out
    }

    /// Print the full report to stdout. Findings are the command's
    /// payload; status logging stays on stderr.
    pub fn print(&self) {
        print!("{}", self.render());
    }
}

fn add(section: &mut Section, source: String, target: String, reason: String) {
    section
        .entry(source)
        .or_default()
        .push(Finding { target, reason });
}

fn count(section: &Section) -> usize {
    section.values().map(|v| v.len()).sum()
}

fn render_section(out: &mut String, name: &str, section: &Section) {
    use std::fmt::Write;

    if section.is_empty() {
        return;
    }
    out.push('\n');

    let file_count = section.len();
    let finding_count = count(section);

    let _ = writeln!(
        out,
        "{} {}",
        name.red().bold(),
        format!(
            "({file_count} file{}, {finding_count} finding{})",
            plural_s(file_count),
            plural_s(finding_count)
        )
        .dimmed()
    );

    for (path, findings) in section {
        let _ = writeln!(out, "{}{}{}", "[".dimmed(), path.cyan(), "]".dimmed());
        for f in findings {
            let _ = match (f.target.is_empty(), f.reason.is_empty()) {
                (false, false) => writeln!(out, "{} {} {}", "→".red(), f.target, f.reason),
                (false, true) => writeln!(out, "{} {}", "→".red(), f.target),
                _ => writeln!(out, "{} {}", "→".red(), f.reason),
            };
        }
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total();
        if total == 0 {
            write!(f, "{}", "all checks passed".green())
        } else {
            write!(
                f,
                "{} {} {}",
                "found".dimmed(),
                total.to_string().red().bold(),
                format!("finding{}", plural_s(total)).dimmed()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = AuditReport::default();
        assert!(report.is_empty());

        report.add_link("a.html".into(), "/missing".into(), "not found".into());
        report.add_link("a.html".into(), "/gone".into(), "not found".into());
        report.add_asset("b.html".into(), "/img.png".into(), "not found".into());
        report.add_io("c.html".into(), "permission denied".into());

        assert_eq!(report.total(), 4);
        assert_eq!(report.links.len(), 1);
        assert_eq!(report.links["a.html"].len(), 2);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_render_lists_sections_and_findings() {
        let mut report = AuditReport::default();
        assert!(report.render().is_empty());

        report.add_link("a.html".into(), "`/missing`".into(), "not found".into());
        report.add_io("b.html".into(), "permission denied".into());

        // Styling may wrap tokens in ANSI escapes; match the plain parts.
        let out = report.render();
        assert!(out.contains("links"));
        assert!(out.contains("a.html"));
        assert!(out.contains("`/missing` not found"));
        assert!(out.contains("b.html"));
        assert!(out.contains("permission denied"));
        // empty sections stay silent
        assert!(!out.contains("hreflang"));
    }

    #[test]
    fn test_display_summary() {
        // Styling may add ANSI escapes around the words, so match on
        // substrings.
        let mut report = AuditReport::default();
        assert!(report.to_string().contains("all checks passed"));

        report.add_link("a.html".into(), "x".into(), String::new());
        let s = report.to_string();
        assert!(s.contains("found") && s.contains('1') && s.contains("finding"));

        report.add_placeholder("a.html".into(), "{{ url }}".into());
        assert!(report.to_string().contains("findings"));
    }
}
