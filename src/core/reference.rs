//! Reference records extracted from HTML documents.
//!
//! A [`Reference`] keeps the raw string exactly as it appears in the source
//! so the fixer can re-emit untouched bytes, plus a line number for
//! diagnostics.

/// What kind of HTML construct a reference was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Anchor destination (`<a href>`)
    Hyperlink,
    /// Single image source (`<img src>`)
    ImageSrc,
    /// One candidate of a responsive set (`<img srcset>`, descriptor dropped)
    SrcsetCandidate,
    /// Stylesheet `url(...)` function argument
    CssUrl,
    /// Alternate-language declaration (`<link rel="alternate" hreflang>`)
    Hreflang,
}

impl RefKind {
    /// Whether this reference names an asset rather than a page.
    pub const fn is_asset(self) -> bool {
        matches!(self, Self::ImageSrc | Self::SrcsetCandidate | Self::CssUrl)
    }
}

/// A single reference extracted from a document
#[derive(Debug, Clone)]
pub struct Reference {
    pub kind: RefKind,
    /// Raw string exactly as written in the source (including any
    /// fragment/query suffix).
    pub raw: String,
    /// 1-based line number of the enclosing tag.
    pub line: usize,
    /// Locale code for `Hreflang` references, `None` otherwise.
    pub hreflang: Option<String>,
    /// Accessible text (`alt` attribute) for `ImageSrc` references.
    pub alt: Option<String>,
}

impl Reference {
    pub fn new(kind: RefKind, raw: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            raw: raw.into(),
            line,
            hreflang: None,
            alt: None,
        }
    }

    /// References containing literal braces are unexpanded template
    /// placeholders: extracted, reported distinctly, never resolved.
    pub fn is_placeholder(&self) -> bool {
        self.raw.contains(['{', '}'])
    }
}
