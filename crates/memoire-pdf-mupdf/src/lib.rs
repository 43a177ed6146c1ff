use std::ops::Range;
use std::path::Path;

use mupdf::{Colorspace, Document, ImageFormat, Matrix, TextPageFlags};

use memoire_pdf::{expand_ligatures, PageRenderer, PageTextSource, PdfError};

/// MuPDF-based implementation of [`PageTextSource`] and [`PageRenderer`].
///
/// This crate is the sole AGPL island — it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
///
/// By default, text in the top 4% and bottom 5% of each page is excluded
/// so running headers and folios ("Université de …    12") do not leak
/// into the marker scans and abstract windows.
pub struct MupdfSource {
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    /// `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    /// `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Scale applied when rendering a page to PNG.
    render_scale: f32,
}

impl Default for MupdfSource {
    fn default() -> Self {
        Self {
            header_exclusion_ratio: Some(0.04),
            footer_exclusion_ratio: Some(0.05),
            render_scale: 2.0,
        }
    }
}

impl MupdfSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the render scale used by [`PageRenderer::render_page_png`].
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }

    fn open(&self, path: &Path) -> Result<Document, PdfError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| PdfError::Open("invalid path encoding".into()))?;
        Document::open(path_str).map_err(|e| PdfError::Open(e.to_string()))
    }

    /// Extract one page's text, header/footer bands excluded. Any per-page
    /// failure degrades to an empty string: an unreadable page counts as a
    /// page without text, it never fails the document.
    fn page_text(&self, document: &Document, index: i32) -> String {
        let Ok(page) = document.load_page(index) else {
            return String::new();
        };
        let Ok(text_page) = page.to_text_page(TextPageFlags::empty()) else {
            return String::new();
        };
        let Ok(page_bounds) = page.bounds() else {
            return String::new();
        };
        let page_height = page_bounds.y1 - page_bounds.y0;

        let header_threshold = self
            .header_exclusion_ratio
            .map(|r| page_bounds.y0 + page_height * r);
        let footer_threshold = self
            .footer_exclusion_ratio
            .map(|r| page_bounds.y1 - page_height * r);

        // Block/line iteration to match PyMuPDF's get_text() behavior
        let mut page_text = String::new();
        for block in text_page.blocks() {
            let block_bounds = block.bounds();

            if let Some(threshold) = header_threshold
                && block_bounds.y1 <= threshold
            {
                continue;
            }
            if let Some(threshold) = footer_threshold
                && block_bounds.y0 >= threshold
            {
                continue;
            }

            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }

        expand_ligatures(&page_text)
    }
}

impl PageTextSource for MupdfSource {
    fn page_count(&self, path: &Path) -> Result<usize, PdfError> {
        let document = self.open(path)?;
        let count = document
            .page_count()
            .map_err(|e| PdfError::Extraction(e.to_string()))?;
        Ok(count.max(0) as usize)
    }

    fn extract_range(&self, path: &Path, range: Range<usize>) -> Result<Vec<String>, PdfError> {
        let document = self.open(path)?;
        Ok(range.map(|i| self.page_text(&document, i as i32)).collect())
    }
}

impl PageRenderer for MupdfSource {
    fn render_page_png(&self, path: &Path, page_index: usize) -> Result<Vec<u8>, PdfError> {
        let document = self.open(path)?;
        let page = document
            .load_page(page_index as i32)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        let matrix = Matrix::new_scale(self.render_scale, self.render_scale);
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), 0.0, false)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        let mut png = Vec::new();
        pixmap
            .write_to(&mut png, ImageFormat::PNG)
            .map_err(|e| PdfError::Render(e.to_string()))?;
        Ok(png)
    }
}
