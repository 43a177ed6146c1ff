use std::ops::Range;
use std::path::Path;

use thiserror::Error;

pub mod analyzer;
pub mod config;
pub mod markers;
pub mod references;
pub mod text;
pub mod toc;

pub use analyzer::analyze;
pub use config::AnalyzerConfig;
pub use text::expand_ligatures;
// Re-export domain types from core (canonical definitions live there)
pub use memoire_core::{AbstractSet, Language, Stage1Result};

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("failed to render page: {0}")]
    Render(String),
    #[error("invalid analyzer configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for per-page PDF text extraction backends.
///
/// Implementors provide the low-level extraction step; the signal analysis
/// (scanned detection, marker scan, TOC and reference heuristics) lives in
/// [`analyzer`]. A failed page must degrade to an empty string in the
/// returned vector, never fail the whole document.
pub trait PageTextSource: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, path: &Path) -> Result<usize, PdfError>;

    /// Extract text for the given 0-based page range. The caller clamps the
    /// range to the document bounds; one string per page, in order.
    fn extract_range(&self, path: &Path, range: Range<usize>) -> Result<Vec<String>, PdfError>;
}

/// Trait for rendering a single page to an image.
///
/// Used when the extraction prompt benefits from layout the text stream
/// loses (title pages with logos, multi-column covers).
pub trait PageRenderer: Send + Sync {
    /// Render the given 0-based page as PNG bytes.
    fn render_page_png(&self, path: &Path, page_index: usize) -> Result<Vec<u8>, PdfError>;
}
