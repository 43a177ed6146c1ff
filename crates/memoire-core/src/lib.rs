//! Canonical domain types for the thesis metadata extraction pipeline.
//!
//! The two extraction stages produce [`Stage1Result`] (offline page-signal
//! analysis) and [`Stage2Result`] (structured output of the generative
//! extraction service). [`merge::merge`] reconciles them into a
//! [`MergedRecord`], the only type that crosses the pipeline boundary, and
//! [`confidence::score_record`] quantifies its completeness.

use serde::{Deserialize, Serialize};

pub mod confidence;
pub mod merge;

pub use confidence::score_record;
pub use merge::merge;

/// Languages the pipeline recognizes in thesis front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    French,
    English,
    Arabic,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::French, Language::English, Language::Arabic];

    /// BCP-47 style tag used in serialized records.
    pub fn tag(self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }
}

/// Abstract text per language. A `None` entry means no abstract was found
/// (or reported) for that language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbstractSet {
    pub fr: Option<String>,
    pub en: Option<String>,
    pub ar: Option<String>,
}

impl AbstractSet {
    pub fn get(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::French => self.fr.as_deref(),
            Language::English => self.en.as_deref(),
            Language::Arabic => self.ar.as_deref(),
        }
    }

    pub fn set(&mut self, lang: Language, text: String) {
        let slot = match lang {
            Language::French => &mut self.fr,
            Language::English => &mut self.en,
            Language::Arabic => &mut self.ar,
        };
        *slot = Some(text);
    }

    pub fn is_empty(&self) -> bool {
        self.fr.is_none() && self.en.is_none() && self.ar.is_none()
    }
}

/// Output of the offline page-signal analysis (Stage 1).
///
/// Invariant: when `is_scanned` is true the analyzer halts early, so
/// `abstracts`, `toc_items`, `toc_page_range` and `reference_count` are
/// all absent/empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage1Result {
    pub total_pages: usize,
    pub pages_checked: usize,
    pub pages_with_text: usize,
    /// `pages_with_text / pages_checked`, 0.0 when no pages were checked.
    pub text_coverage_ratio: f64,
    pub is_scanned: bool,
    pub has_keyword_marker: bool,
    pub abstracts: AbstractSet,
    pub toc_items: Option<Vec<String>>,
    /// 1-based inclusive page window the TOC lines were taken from.
    pub toc_page_range: Option<(usize, usize)>,
    pub reference_count: Option<u32>,
}

/// A named organizational unit (university, faculty, school, department)
/// with its name per language and an optional acronym.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgName {
    pub name_fr: Option<String>,
    pub name_en: Option<String>,
    pub name_ar: Option<String>,
    pub acronym: Option<String>,
}

impl OrgName {
    /// First non-empty name in fr → en → ar order.
    pub fn any_name(&self) -> Option<&str> {
        [&self.name_fr, &self.name_en, &self.name_ar]
            .into_iter()
            .filter_map(|n| n.as_deref())
            .find(|n| !n.trim().is_empty())
    }
}

/// The institutional hierarchy a thesis was defended in. Levels the
/// extraction service does not report stay default-empty, never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstitutionInfo {
    pub university: OrgName,
    pub faculty: OrgName,
    pub school: OrgName,
    pub department: OrgName,
}

/// Core identification fields of the thesis itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThesisInfo {
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
    /// Normalized `YYYY-MM-DD` when the service could resolve it.
    pub defense_date: Option<String>,
    /// e.g. "2019/2020".
    pub academic_year: Option<String>,
    pub thesis_number: Option<String>,
    /// e.g. "doctorat", "master", "magister".
    pub document_type: Option<String>,
    pub total_pages: Option<u32>,
}

impl ThesisInfo {
    pub fn any_title(&self) -> Option<&str> {
        [&self.title_fr, &self.title_en, &self.title_ar]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .find(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Degree {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageInfo {
    /// ISO 639-1 code of the main document language.
    pub primary: Option<String>,
    pub secondary: Vec<String>,
}

/// An academic person attached to the thesis (author, supervisor, jury).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    /// Honorific / academic title, e.g. "Pr.", "Dr.".
    pub title: Option<String>,
    /// Role tag: "author", "supervisor", "president", "examiner", "jury-member".
    pub role: Option<String>,
    /// True when the person is affiliated with another institution.
    pub external: bool,
    pub external_institution: Option<String>,
}

impl Person {
    /// A person record that carries enough to be catalogued on its own.
    pub fn is_complete(&self) -> bool {
        self.last_name.as_deref().is_some_and(|n| !n.trim().is_empty())
            && self.role.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}

/// Output of the generative extraction service (Stage 2).
///
/// Every field is optional; [`Stage2Result::default`] is the explicit empty
/// result returned when the service failed irrecoverably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage2Result {
    pub thesis: ThesisInfo,
    pub institution: InstitutionInfo,
    pub degree: Degree,
    pub language: LanguageInfo,
    pub persons: Vec<Person>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub study_location: Option<String>,
    pub abstracts: AbstractSet,
    /// Chapter titles as recalled by the service (fallback TOC).
    pub chapters: Vec<String>,
    pub reference_count: Option<u32>,
}

/// The reconciled metadata record handed to storage / API collaborators.
///
/// Field-stable JSON shape: additive changes only. Sub-objects are always
/// present (default-empty), never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergedRecord {
    pub file_name: String,
    pub thesis: ThesisInfo,
    pub institution: InstitutionInfo,
    pub degree: Degree,
    pub language: LanguageInfo,
    pub persons: Vec<Person>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub study_location: Option<String>,
    pub abstracts: AbstractSet,
    pub toc: Vec<String>,
    pub reference_count: Option<u32>,
    /// Diagnostic: Stage 1 classified the source as a scanned document.
    pub scanned_pdf: bool,
    /// Diagnostic: a keywords marker was seen somewhere in the checked pages.
    pub has_keywords_marker: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tags() {
        assert_eq!(Language::French.tag(), "fr");
        assert_eq!(Language::Arabic.tag(), "ar");
        assert_eq!(Language::ALL.len(), 3);
    }

    #[test]
    fn abstract_set_get_set() {
        let mut abstracts = AbstractSet::default();
        assert!(abstracts.is_empty());
        abstracts.set(Language::French, "Résumé du mémoire".into());
        assert_eq!(abstracts.get(Language::French), Some("Résumé du mémoire"));
        assert_eq!(abstracts.get(Language::English), None);
        assert!(!abstracts.is_empty());
    }

    #[test]
    fn org_name_prefers_french() {
        let org = OrgName {
            name_fr: Some("Université d'Alger".into()),
            name_en: Some("University of Algiers".into()),
            ..Default::default()
        };
        assert_eq!(org.any_name(), Some("Université d'Alger"));
    }

    #[test]
    fn org_name_skips_blank() {
        let org = OrgName {
            name_fr: Some("   ".into()),
            name_en: Some("University of Algiers".into()),
            ..Default::default()
        };
        assert_eq!(org.any_name(), Some("University of Algiers"));
    }

    #[test]
    fn person_completeness_requires_name_and_role() {
        let mut p = Person {
            last_name: Some("Benali".into()),
            ..Default::default()
        };
        assert!(!p.is_complete());
        p.role = Some("supervisor".into());
        assert!(p.is_complete());
    }

    #[test]
    fn stage2_empty_from_partial_json() {
        // Missing groups must come back default-present, not fail.
        let s2: Stage2Result =
            serde_json::from_str(r#"{"thesis": {"title_fr": "Titre"}}"#).unwrap();
        assert_eq!(s2.thesis.title_fr.as_deref(), Some("Titre"));
        assert!(s2.institution.university.any_name().is_none());
        assert!(s2.persons.is_empty());
    }

    #[test]
    fn merged_record_sub_objects_never_null() {
        let json = serde_json::to_value(MergedRecord::default()).unwrap();
        assert!(json["institution"]["university"].is_object());
        assert!(json["thesis"].is_object());
        assert!(json["abstracts"].is_object());
    }
}
