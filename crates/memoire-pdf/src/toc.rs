//! Table-of-contents line extraction.
//!
//! Works over the pages of the configured TOC window that actually carry a
//! TOC marker. Three line shapes are recognized: a dotted leader ending in
//! a page number, an explicit chapter heading, and a numbered heading
//! followed by a trailing page number. Everything else is prose and is
//! ignored — this is structural harvesting, not layout parsing.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::markers;

/// `Introduction .......... 5` — a leader of dots ending in a page number.
static DOTTED_LEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}[ \t.]*\d{1,4}\s*$").unwrap());

/// `Chapitre 1 …` / `Chapter IV …` at the start of a line.
static CHAPTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:chapitre|chapter)\s+(?:\d{1,3}|[ivxlcdm]{1,7})\b").unwrap()
});

/// `2.3 Protocole expérimental 41` — numbered heading with trailing page.
static NUMBERED_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d{1,3}(?:\.\d{1,3})*\.?\s+\S.*?\s\d{1,4}\s*$").unwrap());

/// True when a page's text looks like it belongs to the table of contents.
pub fn page_has_toc_marker(page_text: &str) -> bool {
    markers::TOC_RE.is_match(page_text)
}

/// Extract TOC entry lines from the concatenated marker-bearing pages.
///
/// Lines are deduplicated preserving first-seen order and capped at
/// `max_items` to bound the payload handed downstream.
pub fn extract_toc_items(pages: &[String], max_items: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for page in pages.iter().filter(|p| page_has_toc_marker(p)) {
        for line in page.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || !is_toc_line(trimmed) {
                continue;
            }
            if seen.insert(trimmed.to_string()) {
                items.push(trimmed.to_string());
                if items.len() >= max_items {
                    return items;
                }
            }
        }
    }

    items
}

fn is_toc_line(line: &str) -> bool {
    DOTTED_LEADER_RE.is_match(line)
        || CHAPTER_RE.is_match(line)
        || NUMBERED_HEADING_RE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toc_page(body: &str) -> Vec<String> {
        vec![format!("Table des matières\n{body}")]
    }

    #[test]
    fn recognizes_the_three_line_shapes() {
        assert!(is_toc_line("Introduction .......... 5"));
        assert!(is_toc_line("Chapitre 1 Méthodologie"));
        assert!(is_toc_line("2.3 Protocole expérimental 41"));
        assert!(!is_toc_line("Ce chapitre présente la problématique générale."));
    }

    #[test]
    fn keeps_matching_lines_in_order() {
        let pages = toc_page(
            "Introduction .......... 5\nChapitre 1 Méthodologie\nDu texte sans motif particulier.",
        );
        let items = extract_toc_items(&pages, 150);
        assert_eq!(items, vec!["Introduction .......... 5", "Chapitre 1 Méthodologie"]);
    }

    #[test]
    fn deduplicates_preserving_first_seen() {
        let pages = toc_page(
            "Introduction .......... 5\nChapitre 1 Méthodologie\nIntroduction .......... 5",
        );
        let items = extract_toc_items(&pages, 150);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], "Introduction .......... 5");
    }

    #[test]
    fn pages_without_marker_are_skipped() {
        let pages = vec!["Introduction .......... 5".to_string()];
        assert!(extract_toc_items(&pages, 150).is_empty());
    }

    #[test]
    fn result_is_capped() {
        let body: String = (1..=40)
            .map(|i| format!("Section {i} .......... {i}\n"))
            .collect();
        let items = extract_toc_items(&toc_page(&body), 10);
        assert_eq!(items.len(), 10);
    }

    #[test]
    fn roman_numeral_chapters_match() {
        assert!(is_toc_line("Chapter IV Results and discussion"));
    }
}
