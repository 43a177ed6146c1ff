//! Reference-count estimation over the trailing pages of a document.
//!
//! This is a best-effort estimate, not a parse: lines that look like
//! citation entries are counted, everything else is ignored, and nothing
//! here can fail a document.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::markers;

/// `[12] `, `(3) `, `7. `, `15) ` — an entry number followed by a separator.
static NUMBERED_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\[\d{1,4}\]|\(\d{1,4}\)|\d{1,4}[.)])\s+\S").unwrap());

/// Bulleted entry styles some faculties use for bibliographies.
static BULLET_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-–—•*▪●]\s+\S").unwrap());

/// Author-year citation signature: a parenthesized 4-digit year.
static YEAR_SIGNATURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?:19|20)\d{2}[a-z]?\)").unwrap());

/// True when a page's text looks like part of the bibliography.
pub fn page_has_reference_marker(page_text: &str) -> bool {
    markers::REFERENCE_RE.is_match(page_text)
}

/// Estimate the number of reference entries in the given tail pages.
///
/// Returns `None` when no tail page carries a references marker — the
/// document may still have a bibliography elsewhere, but there is nothing
/// to anchor the estimate on.
pub fn estimate_reference_count(tail_pages: &[String]) -> Option<u32> {
    let marked: Vec<&String> = tail_pages
        .iter()
        .filter(|p| page_has_reference_marker(p))
        .collect();
    if marked.is_empty() {
        return None;
    }

    let mut count: u32 = 0;
    for page in marked {
        for line in page.lines() {
            if is_reference_line(line) {
                count = count.saturating_add(1);
            }
        }
    }
    Some(count)
}

fn is_reference_line(line: &str) -> bool {
    if NUMBERED_ENTRY_RE.is_match(line) || BULLET_ENTRY_RE.is_match(line) {
        return true;
    }
    YEAR_SIGNATURE_RE.is_match(line) && (line.contains(',') || line.contains(';'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ref_page(body: &str) -> Vec<String> {
        vec![format!("Bibliographie\n{body}")]
    }

    #[test]
    fn counts_numbered_entries_only() {
        let pages = ref_page(
            "[1] Smith, J. (2020). Wireless sensor networks.\n[2] Doe, A. (2019). Routing protocols.\nNot a reference line",
        );
        assert_eq!(estimate_reference_count(&pages), Some(2));
    }

    #[test]
    fn counts_bullets_and_author_year_lines() {
        let pages = ref_page(
            "- Dupont, M. Théorie des graphes, 2003.\nMartin P.; Durand K. (2011); analyse spatiale.\nDes remerciements sans rapport.",
        );
        assert_eq!(estimate_reference_count(&pages), Some(2));
    }

    #[test]
    fn year_without_separator_is_not_counted() {
        // A lone "(2020)" in prose is not a citation signature.
        let pages = ref_page("Publié en (2020) sans liste\n");
        assert_eq!(estimate_reference_count(&pages), Some(0));
    }

    #[test]
    fn no_marker_yields_none() {
        let pages = vec!["Annexe A : données brutes\n1. tableau un\n".to_string()];
        assert_eq!(estimate_reference_count(&pages), None);
    }

    #[test]
    fn unparseable_lines_are_skipped_not_fatal() {
        let pages = ref_page("\u{FFFD}\u{FFFD}\u{FFFD}\n[3] Haddad, R. (2018), capteurs.\n");
        assert_eq!(estimate_reference_count(&pages), Some(1));
    }

    #[test]
    fn parenthesized_entry_numbers_count() {
        let pages = ref_page("(1) premier titre utile\n(2) second titre utile\n");
        assert_eq!(estimate_reference_count(&pages), Some(2));
    }
}
