use crate::PdfError;

/// Knobs for the offline page-signal analysis.
///
/// Defaults follow the behavior of the production catalog: the first 15
/// pages decide the scanned classification, abstracts are looked for in the
/// first 5 pages, the TOC in pages 3–10, references in the last 6 pages.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// How many leading pages are inspected for the coverage ratio.
    pub max_pages: usize,
    /// Below this text-coverage ratio the document is classified scanned.
    pub min_text_ratio: f64,
    /// How many leading pages are searched for abstract markers.
    pub abstract_pages: usize,
    /// Window taken from an abstract marker hit, in characters.
    pub abstract_window_chars: usize,
    /// 1-based first page of the TOC search window.
    pub toc_page_start: usize,
    /// 1-based last page (inclusive) of the TOC search window.
    pub toc_page_end: usize,
    /// Cap on extracted TOC lines, bounding downstream payload size.
    pub toc_max_items: usize,
    /// How many trailing pages are searched for reference entries.
    pub ref_tail_pages: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_pages: 15,
            min_text_ratio: 0.2,
            abstract_pages: 5,
            abstract_window_chars: 6000,
            toc_page_start: 3,
            toc_page_end: 10,
            toc_max_items: 150,
            ref_tail_pages: 6,
        }
    }
}

impl AnalyzerConfig {
    /// Fail fast on contract violations before any page is touched.
    pub fn validate(&self) -> Result<(), PdfError> {
        if self.max_pages == 0 {
            return Err(PdfError::InvalidConfig("max_pages must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.min_text_ratio) {
            return Err(PdfError::InvalidConfig(format!(
                "min_text_ratio must be in [0, 1], got {}",
                self.min_text_ratio
            )));
        }
        if self.toc_page_start == 0 || self.toc_page_end < self.toc_page_start {
            return Err(PdfError::InvalidConfig(format!(
                "TOC page window {}-{} is not a valid 1-based range",
                self.toc_page_start, self.toc_page_end
            )));
        }
        if self.ref_tail_pages == 0 {
            return Err(PdfError::InvalidConfig("ref_tail_pages must be at least 1".into()));
        }
        if self.abstract_window_chars == 0 {
            return Err(PdfError::InvalidConfig(
                "abstract_window_chars must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_pages, 15);
        assert!((config.min_text_ratio - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_max_pages_rejected() {
        let config = AnalyzerConfig { max_pages: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_toc_window_rejected() {
        let config = AnalyzerConfig {
            toc_page_start: 10,
            toc_page_end: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_ratio_rejected() {
        let config = AnalyzerConfig { min_text_ratio: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
