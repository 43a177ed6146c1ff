//! Field-level reconciliation of the two extraction stages.
//!
//! Precedence: Stage 2 wins outright for the fields Stage 1 has no opinion
//! on (titles, dates, institutions, persons, …). For the fields the
//! page-anchored heuristics are more reliable on — verbatim abstracts, the
//! table of contents, the reference count — Stage 1 wins whenever it
//! produced something, with Stage 2 as the fallback.

use crate::{AbstractSet, MergedRecord, Stage1Result, Stage2Result};

/// Merge both stage outputs into one record.
///
/// Pure and total: any combination of inputs (including both empty) yields
/// a record. Diagnostics (`scanned_pdf`, `has_keywords_marker`) are copied
/// verbatim from Stage 1, defaulting to false when Stage 1 is absent.
pub fn merge(
    stage1: Option<&Stage1Result>,
    stage2: &Stage2Result,
    file_name: &str,
) -> MergedRecord {
    let abstracts = AbstractSet {
        fr: prefer_text(
            stage1.and_then(|s| s.abstracts.fr.as_deref()),
            stage2.abstracts.fr.as_deref(),
        ),
        en: prefer_text(
            stage1.and_then(|s| s.abstracts.en.as_deref()),
            stage2.abstracts.en.as_deref(),
        ),
        ar: prefer_text(
            stage1.and_then(|s| s.abstracts.ar.as_deref()),
            stage2.abstracts.ar.as_deref(),
        ),
    };

    let toc = stage1
        .and_then(|s| s.toc_items.as_ref())
        .filter(|items| !items.is_empty())
        .cloned()
        .unwrap_or_else(|| stage2.chapters.clone());

    let reference_count = stage1
        .and_then(|s| s.reference_count)
        .or(stage2.reference_count);

    MergedRecord {
        file_name: file_name.to_string(),
        thesis: stage2.thesis.clone(),
        institution: stage2.institution.clone(),
        degree: stage2.degree.clone(),
        language: stage2.language.clone(),
        persons: stage2.persons.clone(),
        categories: stage2.categories.clone(),
        keywords: stage2.keywords.clone(),
        study_location: stage2.study_location.clone(),
        abstracts,
        toc,
        reference_count,
        scanned_pdf: stage1.is_some_and(|s| s.is_scanned),
        has_keywords_marker: stage1.is_some_and(|s| s.has_keyword_marker),
    }
}

/// Stage 1 text wins unless it is missing or blank.
fn prefer_text(stage1: Option<&str>, stage2: Option<&str>) -> Option<String> {
    stage1
        .filter(|t| !t.trim().is_empty())
        .or(stage2)
        .map(str::to_string)
}
