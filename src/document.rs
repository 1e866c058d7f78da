//! The narrow document interface the redaction core depends on.
//!
//! The core never talks to a PDF library directly. It needs exactly three
//! capabilities: open a file into pages, query a page's geometry and text
//! layer, and commit redactions before saving a new artifact. MuPDF provides
//! the production implementation in [`crate::redaction::secure`].

use std::path::Path;

use crate::error::RedactorResult;
use crate::geometry::Rect;
use crate::redaction::ApplyOptions;

/// A single page that can be searched and redacted.
pub trait RedactablePage {
    /// The page rectangle in page space.
    fn bounds(&self) -> RedactorResult<Rect>;

    /// Literal, case-sensitive search over the page's text layer.
    ///
    /// Hits are returned in text order. An absent needle yields an empty
    /// vector; `Err` is reserved for backend failures.
    fn search(&self, needle: &str) -> RedactorResult<Vec<Rect>>;

    /// Marks every region for redaction and commits the page, stripping the
    /// underlying content inside each region.
    fn apply_redactions(&mut self, regions: &[Rect], options: &ApplyOptions)
        -> RedactorResult<()>;
}

/// An opened document owning its pages.
pub trait RedactableDocument {
    type Page: RedactablePage;

    fn page_count(&self) -> RedactorResult<usize>;

    /// Loads the page at a 0-based index.
    fn load_page(&self, index: usize) -> RedactorResult<Self::Page>;

    /// Writes the whole document to `output` with garbage collection and
    /// stream compression.
    fn save_compacted(&self, output: &Path) -> RedactorResult<()>;
}

/// Opens source files into [`RedactableDocument`]s.
pub trait DocumentBackend {
    type Document: RedactableDocument;

    fn open(&self, path: &Path) -> RedactorResult<Self::Document>;

    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;
}
