//! Completeness scoring over a merged record.
//!
//! The score is a weighted point system over five buckets whose relative
//! maxima encode their importance: core thesis identification weighs most,
//! auxiliary metadata least. Each rule awards a fixed number of points when
//! its field is present; the final score is awarded / attainable, clamped
//! to [0, 1]. This measures completeness, not factual correctness.

use crate::MergedRecord;

/// Scoring bucket a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Core,
    Persons,
    Institution,
    Enhanced,
    Auxiliary,
}

/// One row of the scoring table.
pub struct Rule {
    pub name: &'static str,
    pub bucket: Bucket,
    pub max_points: f64,
    award: fn(&MergedRecord) -> f64,
}

impl Rule {
    /// Points this rule grants for the given record, capped at `max_points`.
    pub fn award(&self, record: &MergedRecord) -> f64 {
        (self.award)(record).clamp(0.0, self.max_points)
    }
}

fn has(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn points_if(present: bool, points: f64) -> f64 {
    if present { points } else { 0.0 }
}

fn any_title(r: &MergedRecord) -> f64 {
    points_if(r.thesis.any_title().is_some(), 10.0)
}

fn document_type(r: &MergedRecord) -> f64 {
    points_if(has(&r.thesis.document_type), 4.0)
}

fn date_signal(r: &MergedRecord) -> f64 {
    points_if(has(&r.thesis.defense_date) || has(&r.thesis.academic_year), 6.0)
}

fn persons_present(r: &MergedRecord) -> f64 {
    points_if(!r.persons.is_empty(), 8.0)
}

/// 2 points per complete person, capped — a full jury should not drown out
/// a missing title.
fn persons_complete(r: &MergedRecord) -> f64 {
    2.0 * r.persons.iter().filter(|p| p.is_complete()).count() as f64
}

fn university_name(r: &MergedRecord) -> f64 {
    points_if(r.institution.university.any_name().is_some(), 5.0)
}

fn faculty_name(r: &MergedRecord) -> f64 {
    points_if(r.institution.faculty.any_name().is_some(), 4.0)
}

fn degree_name(r: &MergedRecord) -> f64 {
    points_if(has(&r.degree.name), 4.0)
}

fn any_abstract(r: &MergedRecord) -> f64 {
    points_if(!r.abstracts.is_empty(), 4.0)
}

fn toc_present(r: &MergedRecord) -> f64 {
    points_if(!r.toc.is_empty(), 3.0)
}

fn reference_count(r: &MergedRecord) -> f64 {
    points_if(r.reference_count.is_some_and(|n| n > 0), 2.0)
}

fn specialization(r: &MergedRecord) -> f64 {
    points_if(has(&r.degree.specialization), 2.0)
}

fn keywords(r: &MergedRecord) -> f64 {
    points_if(!r.keywords.is_empty(), 2.0)
}

fn categories(r: &MergedRecord) -> f64 {
    points_if(!r.categories.is_empty(), 2.0)
}

fn study_location(r: &MergedRecord) -> f64 {
    points_if(has(&r.study_location), 1.0)
}

fn total_pages(r: &MergedRecord) -> f64 {
    points_if(r.thesis.total_pages.is_some_and(|n| n > 0), 1.0)
}

/// The scoring table. New fields are added as rows, each with its own test.
pub static RULES: &[Rule] = &[
    Rule { name: "title", bucket: Bucket::Core, max_points: 10.0, award: any_title },
    Rule { name: "document_type", bucket: Bucket::Core, max_points: 4.0, award: document_type },
    Rule { name: "date_signal", bucket: Bucket::Core, max_points: 6.0, award: date_signal },
    Rule { name: "persons_present", bucket: Bucket::Persons, max_points: 8.0, award: persons_present },
    Rule { name: "persons_complete", bucket: Bucket::Persons, max_points: 6.0, award: persons_complete },
    Rule { name: "university", bucket: Bucket::Institution, max_points: 5.0, award: university_name },
    Rule { name: "faculty", bucket: Bucket::Institution, max_points: 4.0, award: faculty_name },
    Rule { name: "degree", bucket: Bucket::Institution, max_points: 4.0, award: degree_name },
    Rule { name: "abstract", bucket: Bucket::Enhanced, max_points: 4.0, award: any_abstract },
    Rule { name: "toc", bucket: Bucket::Enhanced, max_points: 3.0, award: toc_present },
    Rule { name: "reference_count", bucket: Bucket::Enhanced, max_points: 2.0, award: reference_count },
    Rule { name: "specialization", bucket: Bucket::Enhanced, max_points: 2.0, award: specialization },
    Rule { name: "keywords", bucket: Bucket::Auxiliary, max_points: 2.0, award: keywords },
    Rule { name: "categories", bucket: Bucket::Auxiliary, max_points: 2.0, award: categories },
    Rule { name: "study_location", bucket: Bucket::Auxiliary, max_points: 1.0, award: study_location },
    Rule { name: "total_pages", bucket: Bucket::Auxiliary, max_points: 1.0, award: total_pages },
];

/// Score a record's completeness in [0, 1].
pub fn score_record(record: &MergedRecord) -> f64 {
    let attainable: f64 = RULES.iter().map(|r| r.max_points).sum();
    if attainable <= 0.0 {
        return 0.0;
    }
    let awarded: f64 = RULES.iter().map(|r| r.award(record)).sum();
    (awarded / attainable).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AbstractSet, Degree, InstitutionInfo, OrgName, Person, ThesisInfo};

    fn full_record() -> MergedRecord {
        MergedRecord {
            file_name: "full.pdf".into(),
            thesis: ThesisInfo {
                title_fr: Some("Étude des réseaux de capteurs".into()),
                defense_date: Some("2021-07-01".into()),
                academic_year: Some("2020/2021".into()),
                document_type: Some("doctorat".into()),
                total_pages: Some(214),
                ..Default::default()
            },
            institution: InstitutionInfo {
                university: OrgName {
                    name_fr: Some("Université de Constantine".into()),
                    ..Default::default()
                },
                faculty: OrgName {
                    name_fr: Some("Faculté des sciences".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            degree: Degree {
                name: Some("Doctorat en sciences".into()),
                specialization: Some("Informatique".into()),
                ..Default::default()
            },
            persons: vec![
                Person {
                    last_name: Some("Benali".into()),
                    first_name: Some("Amine".into()),
                    role: Some("author".into()),
                    ..Default::default()
                },
                Person {
                    last_name: Some("Haddad".into()),
                    role: Some("supervisor".into()),
                    ..Default::default()
                },
                Person {
                    last_name: Some("Cherif".into()),
                    role: Some("president".into()),
                    ..Default::default()
                },
            ],
            categories: vec!["informatique".into()],
            keywords: vec!["réseaux".into(), "capteurs".into()],
            study_location: Some("Constantine".into()),
            abstracts: AbstractSet {
                fr: Some("Résumé…".into()),
                ..Default::default()
            },
            toc: vec!["Introduction".into(), "Chapitre 1".into()],
            reference_count: Some(120),
            ..Default::default()
        }
    }

    #[test]
    fn empty_record_scores_zero() {
        assert_eq!(score_record(&MergedRecord::default()), 0.0);
    }

    #[test]
    fn full_record_scores_one() {
        let score = score_record(&full_record());
        assert!((score - 1.0).abs() < 1e-9, "expected 1.0, got {score}");
    }

    #[test]
    fn score_always_in_unit_interval() {
        for record in [MergedRecord::default(), full_record()] {
            let score = score_record(&record);
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn title_rule_awards_for_any_language() {
        let mut record = MergedRecord::default();
        record.thesis.title_ar = Some("دراسة".into());
        let rule = RULES.iter().find(|r| r.name == "title").unwrap();
        assert_eq!(rule.award(&record), 10.0);
    }

    #[test]
    fn persons_complete_is_capped() {
        let mut record = MergedRecord::default();
        record.persons = (0..10)
            .map(|i| Person {
                last_name: Some(format!("Name{i}")),
                role: Some("jury-member".into()),
                ..Default::default()
            })
            .collect();
        let rule = RULES.iter().find(|r| r.name == "persons_complete").unwrap();
        assert_eq!(rule.award(&record), 6.0);
    }

    #[test]
    fn date_signal_from_academic_year_alone() {
        let mut record = MergedRecord::default();
        record.thesis.academic_year = Some("2018/2019".into());
        let rule = RULES.iter().find(|r| r.name == "date_signal").unwrap();
        assert_eq!(rule.award(&record), 6.0);
    }

    #[test]
    fn blank_strings_do_not_score() {
        let mut record = MergedRecord::default();
        record.degree.name = Some("   ".into());
        let rule = RULES.iter().find(|r| r.name == "degree").unwrap();
        assert_eq!(rule.award(&record), 0.0);
    }

    #[test]
    fn score_is_monotonic_as_fields_appear() {
        let mut record = MergedRecord::default();
        let mut last = score_record(&record);

        record.thesis.title_fr = Some("Titre".into());
        let s = score_record(&record);
        assert!(s >= last);
        last = s;

        record.persons.push(Person {
            last_name: Some("Benali".into()),
            role: Some("author".into()),
            ..Default::default()
        });
        let s = score_record(&record);
        assert!(s >= last);
        last = s;

        record.abstracts.fr = Some("Résumé".into());
        let s = score_record(&record);
        assert!(s >= last);
        last = s;

        record.keywords.push("capteurs".into());
        let s = score_record(&record);
        assert!(s >= last);
        last = s;

        record.reference_count = Some(30);
        let s = score_record(&record);
        assert!(s >= last);
    }

    #[test]
    fn core_bucket_outweighs_auxiliary() {
        let mut core_only = MergedRecord::default();
        core_only.thesis.title_fr = Some("Titre".into());

        let mut aux_only = MergedRecord::default();
        aux_only.keywords.push("mot".into());
        aux_only.categories.push("cat".into());
        aux_only.study_location = Some("Oran".into());
        aux_only.thesis.total_pages = Some(100);

        assert!(score_record(&core_only) > score_record(&aux_only));
    }
}
