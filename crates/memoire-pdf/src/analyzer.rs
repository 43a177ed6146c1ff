//! Offline page-signal analysis (Stage 1).
//!
//! Everything here is deterministic and local: the same document bytes
//! always produce the same [`Stage1Result`], and no network is touched.
//! The scanned classification is the pipeline's main cost gate — a document
//! whose leading pages yield almost no text is not worth a generative
//! extraction call, so the analyzer stops at the diagnostics.

use std::path::Path;

use memoire_core::{AbstractSet, Language, Stage1Result};
use regex::Regex;

use crate::config::AnalyzerConfig;
use crate::markers;
use crate::references::estimate_reference_count;
use crate::toc::extract_toc_items;
use crate::{PageTextSource, PdfError};

/// Run the full Stage 1 analysis over a document.
///
/// Errors only on contract violations (invalid config) or a document that
/// cannot be opened at all; individual unreadable pages come back as empty
/// text from the source and merely lower the coverage ratio.
pub fn analyze(
    source: &dyn PageTextSource,
    path: &Path,
    config: &AnalyzerConfig,
) -> Result<Stage1Result, PdfError> {
    config.validate()?;

    let total_pages = source.page_count(path)?;
    let pages_checked = config.max_pages.min(total_pages);
    let first_pages = if pages_checked > 0 {
        source.extract_range(path, 0..pages_checked)?
    } else {
        Vec::new()
    };

    let pages_with_text = first_pages.iter().filter(|t| !t.trim().is_empty()).count();
    let text_coverage_ratio = if pages_checked == 0 {
        0.0
    } else {
        pages_with_text as f64 / pages_checked as f64
    };
    let is_scanned = text_coverage_ratio < config.min_text_ratio;

    // The keyword flag is computed even for scanned documents, from
    // whatever text was recovered.
    let recovered = first_pages.join("\n");
    let has_keyword_marker = markers::KEYWORD_RE.is_match(&recovered);

    if is_scanned {
        tracing::debug!(
            path = %path.display(),
            total_pages,
            pages_with_text,
            ratio = text_coverage_ratio,
            "classified as scanned, skipping structural analysis"
        );
        return Ok(Stage1Result {
            total_pages,
            pages_checked,
            pages_with_text,
            text_coverage_ratio,
            is_scanned: true,
            has_keyword_marker,
            ..Default::default()
        });
    }

    let head: String = first_pages
        .iter()
        .take(config.abstract_pages)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    let abstracts = extract_abstracts(&head, config.abstract_window_chars);

    // TOC window: 1-based inclusive, clamped to the document.
    let toc_start = config.toc_page_start.min(total_pages.max(1));
    let toc_end = config.toc_page_end.min(total_pages);
    let (toc_items, toc_page_range) = if toc_end >= toc_start && total_pages > 0 {
        let toc_pages = source.extract_range(path, toc_start - 1..toc_end)?;
        let items = extract_toc_items(&toc_pages, config.toc_max_items);
        if items.is_empty() {
            (None, None)
        } else {
            (Some(items), Some((toc_start, toc_end)))
        }
    } else {
        (None, None)
    };

    let tail_start = total_pages.saturating_sub(config.ref_tail_pages);
    let tail_pages = if total_pages > 0 {
        source.extract_range(path, tail_start..total_pages)?
    } else {
        Vec::new()
    };
    let reference_count = estimate_reference_count(&tail_pages);

    tracing::debug!(
        path = %path.display(),
        total_pages,
        ratio = text_coverage_ratio,
        has_keyword_marker,
        toc_items = toc_items.as_ref().map_or(0, Vec::len),
        reference_count,
        "stage 1 analysis complete"
    );

    Ok(Stage1Result {
        total_pages,
        pages_checked,
        pages_with_text,
        text_coverage_ratio,
        is_scanned: false,
        has_keyword_marker,
        abstracts,
        toc_items,
        toc_page_range,
        reference_count,
    })
}

/// Search the leading pages for one abstract snippet per language bucket.
fn extract_abstracts(head: &str, window_chars: usize) -> AbstractSet {
    let mut abstracts = AbstractSet::default();
    for lang in Language::ALL {
        if let Some(snippet) = extract_abstract(head, lang, window_chars) {
            abstracts.set(lang, snippet);
        }
    }
    abstracts
}

/// Markers are tried in list order; the first hit wins for the bucket.
///
/// The snippet is a bounded character window starting at the marker,
/// truncated at the first next-section heading found after the marker
/// itself so it does not bleed into keywords or the TOC.
fn extract_abstract(head: &str, lang: Language, window_chars: usize) -> Option<String> {
    for re in markers::abstract_regexes(lang) {
        let Some(hit) = re.find(head) else { continue };

        let window: String = head[hit.start()..].chars().take(window_chars).collect();
        // A tiny window can end inside the marker itself.
        let marker_len = (hit.end() - hit.start()).min(window.len());
        let snippet = truncate_at_next_section(&window, marker_len, &markers::NEXT_SECTION_RE);

        let snippet = snippet.trim();
        if !snippet.is_empty() {
            return Some(snippet.to_string());
        }
    }
    None
}

/// Cut `window` at the first next-section heading at or after `search_from`
/// (a byte offset guaranteed to sit on a char boundary: it is the length of
/// the marker match the window starts with).
fn truncate_at_next_section<'a>(window: &'a str, search_from: usize, next_re: &Regex) -> &'a str {
    match next_re.find_at(window, search_from) {
        Some(end) => &window[..end.start()],
        None => window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Range;
    use std::path::PathBuf;

    /// In-memory page source used across the analyzer tests.
    struct FakeSource {
        pages: Vec<String>,
    }

    impl FakeSource {
        fn new<const N: usize>(pages: [&str; N]) -> Self {
            Self {
                pages: pages.iter().map(|p| p.to_string()).collect(),
            }
        }
    }

    impl PageTextSource for FakeSource {
        fn page_count(&self, _path: &Path) -> Result<usize, PdfError> {
            Ok(self.pages.len())
        }

        fn extract_range(&self, _path: &Path, range: Range<usize>) -> Result<Vec<String>, PdfError> {
            Ok(self.pages[range].to_vec())
        }
    }

    fn path() -> PathBuf {
        PathBuf::from("thesis.pdf")
    }

    #[test]
    fn coverage_ratio_stays_in_unit_interval() {
        let source = FakeSource::new(["texte", "", "texte", ""]);
        let result = analyze(&source, &path(), &AnalyzerConfig::default()).unwrap();
        assert!((0.0..=1.0).contains(&result.text_coverage_ratio));
        assert_eq!(result.pages_checked, 4);
        assert_eq!(result.pages_with_text, 2);
    }

    #[test]
    fn scanned_iff_ratio_below_threshold() {
        let source = FakeSource::new(["", "", "", "", "texte"]);
        let config = AnalyzerConfig::default();
        let result = analyze(&source, &path(), &config).unwrap();
        assert_eq!(
            result.is_scanned,
            result.text_coverage_ratio < config.min_text_ratio
        );
        assert!(!result.is_scanned); // 1/5 = 0.2 is not below 0.2
    }

    #[test]
    fn all_blank_document_is_scanned_with_no_deep_fields() {
        let source = FakeSource::new(["", "", ""]);
        let result = analyze(&source, &path(), &AnalyzerConfig::default()).unwrap();
        assert!(result.is_scanned);
        assert_eq!(result.text_coverage_ratio, 0.0);
        assert!(result.abstracts.is_empty());
        assert!(result.toc_items.is_none());
        assert!(result.toc_page_range.is_none());
        assert!(result.reference_count.is_none());
    }

    #[test]
    fn keyword_flag_computed_on_scanned_documents() {
        // One readable page among ten: scanned, but the flag still counts.
        let mut pages = vec![String::new(); 10];
        pages[3] = "Mots-clés : réseaux de capteurs".into();
        let source = FakeSource { pages };
        let result = analyze(&source, &path(), &AnalyzerConfig::default()).unwrap();
        assert!(result.is_scanned);
        assert!(result.has_keyword_marker);
    }

    #[test]
    fn french_abstract_extracted_and_truncated() {
        let page2 = "Résumé\nCe travail étudie les réseaux de capteurs sans fil.\nIl propose un protocole de routage.\nMots-clés : capteurs, routage\n";
        let source = FakeSource::new(["Page de garde", page2, "", "suite", "fin"]);
        let result = analyze(&source, &path(), &AnalyzerConfig::default()).unwrap();
        let abstract_fr = result.abstracts.fr.expect("abstract_fr");
        assert!(abstract_fr.starts_with("Résumé"));
        assert!(abstract_fr.contains("protocole de routage"));
        assert!(!abstract_fr.contains("Mots-clés"));
    }

    #[test]
    fn one_snippet_per_language_bucket() {
        let page = "Résumé\nTexte français ici.\nAbstract\nEnglish text here.\n";
        let source = FakeSource::new([page, "", "", "", ""]);
        let result = analyze(&source, &path(), &AnalyzerConfig::default()).unwrap();
        assert!(result.abstracts.fr.is_some());
        assert!(result.abstracts.en.is_some());
        assert!(result.abstracts.ar.is_none());
    }

    #[test]
    fn abstract_window_is_bounded() {
        let body = "x".repeat(20_000);
        let page = format!("Résumé\n{body}");
        let source = FakeSource::new([&page, "", "", "", ""]);
        let config = AnalyzerConfig { abstract_window_chars: 100, ..Default::default() };
        let result = analyze(&source, &path(), &config).unwrap();
        let abstract_fr = result.abstracts.fr.unwrap();
        assert!(abstract_fr.chars().count() <= 100);
    }

    #[test]
    fn toc_found_in_configured_window() {
        let toc_page = "Table des matières\nIntroduction .......... 5\nChapitre 1 Méthodologie\nConclusion .......... 88\n";
        let source = FakeSource::new([
            "garde", "résumé du texte", toc_page, "corps", "corps", "corps",
        ]);
        let result = analyze(&source, &path(), &AnalyzerConfig::default()).unwrap();
        let items = result.toc_items.expect("toc items");
        assert_eq!(items.len(), 3);
        assert_eq!(result.toc_page_range, Some((3, 6)));
    }

    #[test]
    fn reference_count_from_tail_pages() {
        let refs_page = "Bibliographie\n[1] Smith, J. (2020). Sensors.\n[2] Doe, A. (2019). Routing.\n";
        let pages: Vec<String> = (0..19)
            .map(|i| format!("page {i} avec du texte"))
            .chain([refs_page.to_string()])
            .collect();
        let source = FakeSource { pages };
        let result = analyze(&source, &path(), &AnalyzerConfig::default()).unwrap();
        assert_eq!(result.reference_count, Some(2));
    }

    #[test]
    fn zero_page_document_yields_zero_ratio() {
        let source = FakeSource { pages: vec![] };
        let result = analyze(&source, &path(), &AnalyzerConfig::default()).unwrap();
        assert_eq!(result.total_pages, 0);
        assert_eq!(result.pages_checked, 0);
        assert_eq!(result.text_coverage_ratio, 0.0);
        assert!(result.is_scanned);
    }

    #[test]
    fn invalid_config_is_rejected_at_the_boundary() {
        let source = FakeSource::new(["texte"]);
        let config = AnalyzerConfig { max_pages: 0, ..Default::default() };
        assert!(matches!(
            analyze(&source, &path(), &config),
            Err(PdfError::InvalidConfig(_))
        ));
    }

    #[test]
    fn same_input_same_output() {
        let source = FakeSource::new(["Résumé\ndu texte déterministe", "deux", "trois"]);
        let config = AnalyzerConfig::default();
        let first = analyze(&source, &path(), &config).unwrap();
        let second = analyze(&source, &path(), &config).unwrap();
        assert_eq!(first, second);
    }
}
