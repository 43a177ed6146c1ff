//! Multilingual section markers, kept as plain ordered lists per language.
//!
//! The analyzer carries no locale-specific branching: every heuristic takes
//! a marker list and matches it case-insensitively. Extending coverage to a
//! new language means adding entries here, nothing else.

use memoire_core::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Abstract section markers, in priority order per language.
pub const ABSTRACT_MARKERS_FR: &[&str] = &["résumé", "resume"];
pub const ABSTRACT_MARKERS_EN: &[&str] = &["abstract", "summary"];
pub const ABSTRACT_MARKERS_AR: &[&str] = &["الملخص", "ملخص", "موجز"];

/// Keyword-list markers across the three languages.
pub const KEYWORD_MARKERS: &[&str] = &[
    "mots-clés",
    "mots clés",
    "mots cles",
    "keywords",
    "key words",
    "descripteurs",
    "الكلمات المفتاحية",
    "كلمات مفتاحية",
];

/// Table-of-contents markers.
pub const TOC_MARKERS: &[&str] = &[
    "table des matières",
    "table des matieres",
    "sommaire",
    "table of contents",
    "contents",
    "فهرس المحتويات",
    "الفهرس",
];

/// References / bibliography section markers.
pub const REFERENCE_MARKERS: &[&str] = &[
    "bibliographie",
    "références bibliographiques",
    "références",
    "references",
    "bibliography",
    "webographie",
    "قائمة المراجع",
    "المراجع",
];

pub fn abstract_markers(lang: Language) -> &'static [&'static str] {
    match lang {
        Language::French => ABSTRACT_MARKERS_FR,
        Language::English => ABSTRACT_MARKERS_EN,
        Language::Arabic => ABSTRACT_MARKERS_AR,
    }
}

fn compile_each(markers: &[&str]) -> Vec<Regex> {
    markers
        .iter()
        .map(|m| Regex::new(&format!("(?i){}", regex::escape(m))).unwrap())
        .collect()
}

fn compile_any(markers: &[&str]) -> Regex {
    let alternation = markers
        .iter()
        .map(|m| regex::escape(m))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).unwrap()
}

/// One compiled pattern per abstract marker, preserving list order so the
/// first marker in the list wins over later ones.
pub(crate) static ABSTRACT_RES_FR: Lazy<Vec<Regex>> =
    Lazy::new(|| compile_each(ABSTRACT_MARKERS_FR));
pub(crate) static ABSTRACT_RES_EN: Lazy<Vec<Regex>> =
    Lazy::new(|| compile_each(ABSTRACT_MARKERS_EN));
pub(crate) static ABSTRACT_RES_AR: Lazy<Vec<Regex>> =
    Lazy::new(|| compile_each(ABSTRACT_MARKERS_AR));

pub(crate) fn abstract_regexes(lang: Language) -> &'static [Regex] {
    match lang {
        Language::French => &ABSTRACT_RES_FR,
        Language::English => &ABSTRACT_RES_EN,
        Language::Arabic => &ABSTRACT_RES_AR,
    }
}

/// Membership patterns for marker lists where priority does not matter.
pub(crate) static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| compile_any(KEYWORD_MARKERS));
pub(crate) static TOC_RE: Lazy<Regex> = Lazy::new(|| compile_any(TOC_MARKERS));
pub(crate) static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| compile_any(REFERENCE_MARKERS));

/// Line-anchored markers that end an abstract window: the section that
/// typically follows a résumé (keywords, TOC, introduction, first chapter,
/// references).
pub(crate) static NEXT_SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:table\s+des\s+mati[eè]res|sommaire|table\s+of\s+contents|contents\b|mots[ \-]?cl[eé]s|key\s?words|descripteurs|introduction\b|chapitre\b|chapter\b|r[eé]f[eé]rences|references\b|bibliographie|bibliography)",
    )
    .unwrap()
});
