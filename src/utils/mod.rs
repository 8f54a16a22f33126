//! Utility modules: URL handling, date formatting, XML escaping, atomic
//! file writes.

pub mod date;
pub mod fsx;
pub mod url;
pub mod xml;

/// Pluralize: returns "s" if count != 1
#[inline]
pub fn plural_s(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Format a count with a pluralized noun: "1 file", "3 files"
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}
