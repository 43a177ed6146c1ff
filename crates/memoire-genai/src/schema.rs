//! The response schema sent with every extraction request.
//!
//! Owned by this client as a versioned constant — consumers read it, nobody
//! mutates it. The shape mirrors [`memoire_core::Stage2Result`]; keep the
//! two in sync and bump the version on any change.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Bumped whenever the schema shape changes.
pub const EXTRACTION_SCHEMA_VERSION: &str = "2";

fn nullable_string() -> Value {
    json!({ "type": "string", "nullable": true })
}

fn org_name() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name_fr": nullable_string(),
            "name_en": nullable_string(),
            "name_ar": nullable_string(),
            "acronym": nullable_string(),
        }
    })
}

/// JSON response schema for the structured extraction call, in the OpenAPI
/// subset the generative service accepts.
pub static EXTRACTION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "thesis": {
                "type": "object",
                "properties": {
                    "title_fr": nullable_string(),
                    "title_en": nullable_string(),
                    "title_ar": nullable_string(),
                    "defense_date": { "type": "string", "nullable": true,
                        "description": "Defense or submission date, normalized to YYYY-MM-DD" },
                    "academic_year": { "type": "string", "nullable": true,
                        "description": "e.g. 2019/2020" },
                    "thesis_number": nullable_string(),
                    "document_type": { "type": "string", "nullable": true,
                        "description": "doctorat, magister, master or licence" },
                    "total_pages": { "type": "integer", "nullable": true },
                }
            },
            "institution": {
                "type": "object",
                "properties": {
                    "university": org_name(),
                    "faculty": org_name(),
                    "school": org_name(),
                    "department": org_name(),
                }
            },
            "degree": {
                "type": "object",
                "properties": {
                    "name": nullable_string(),
                    "abbreviation": nullable_string(),
                    "specialization": nullable_string(),
                }
            },
            "language": {
                "type": "object",
                "properties": {
                    "primary": { "type": "string", "nullable": true,
                        "description": "ISO 639-1 code of the main text language" },
                    "secondary": { "type": "array", "items": { "type": "string" } },
                }
            },
            "persons": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "last_name": nullable_string(),
                        "first_name": nullable_string(),
                        "title": { "type": "string", "nullable": true,
                            "description": "Honorific, e.g. Pr. or Dr." },
                        "role": { "type": "string", "nullable": true,
                            "description": "author, supervisor, president, examiner or jury-member" },
                        "external": { "type": "boolean" },
                        "external_institution": nullable_string(),
                    }
                }
            },
            "categories": { "type": "array", "items": { "type": "string" } },
            "keywords": { "type": "array", "items": { "type": "string" } },
            "study_location": nullable_string(),
            "abstracts": {
                "type": "object",
                "properties": {
                    "fr": nullable_string(),
                    "en": nullable_string(),
                    "ar": nullable_string(),
                }
            },
            "chapters": { "type": "array", "items": { "type": "string" } },
            "reference_count": { "type": "integer", "nullable": true },
        }
    })
});
