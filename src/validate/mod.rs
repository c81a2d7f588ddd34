//! Schema validation.
//!
//! Validation walks the raw JSON value and collects every violation with the
//! path it occurred at, instead of stopping at the first one, so a single
//! report is enough to correct an input. Only a record without violations is
//! converted into its typed form.

mod checker;
mod schema;

use crate::detect::DocType;
use crate::error::{Error, Result};
use crate::model::{DocumentRecord, Language};
use checker::Checker;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of constraint a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// A required field is absent
    Required,
    /// A field has the wrong JSON type
    Type,
    /// A value is outside its enumerated set
    Enum,
    /// A string does not match its pattern
    Pattern,
    /// A number or date is out of range
    Range,
    /// An array has the wrong number of items
    Cardinality,
    /// A bold span lies outside its text
    SpanBounds,
    /// Two bold spans overlap
    SpanOverlap,
    /// `bold_terms` and `bold_spans` on the same field
    ExclusiveFormatting,
    /// A section title does not match the localized vocabulary
    SectionTitle,
    /// An explicit color is not in the style's palette
    Palette,
    /// An inferred item carries an unrelated explicit color
    Provenance,
    /// Bullets nest deeper than one sub-item level
    Nesting,
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Location in the record (e.g. `description.sections[2].title`)
    pub path: String,
    /// Broken constraint
    pub constraint: Constraint,
    /// Human-readable explanation
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<root>" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// All violations found in one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// Violations in discovery order
    pub violations: Vec<Violation>,
}

impl ValidationErrors {
    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Check if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Check whether any violation breaks the given constraint.
    pub fn has(&self, constraint: Constraint) -> bool {
        self.violations.iter().any(|v| v.constraint == constraint)
    }

    /// Violations at an exact path.
    pub fn at(&self, path: &str) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.path == path).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.len() {
            0 => write!(f, "no violations"),
            1 => write!(f, "{}", self.violations[0]),
            n => {
                write!(f, "{} violations (first: {})", n, self.violations[0])
            }
        }
    }
}

/// A record that passed validation.
///
/// Can only be obtained from [`validate`], so holding one proves every
/// schema constraint was checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    record: DocumentRecord,
}

impl ValidatedRecord {
    /// The typed record.
    pub fn record(&self) -> &DocumentRecord {
        &self.record
    }

    /// Document type.
    pub fn doc_type(&self) -> DocType {
        self.record.doc_type()
    }

    /// Declared language.
    pub fn language(&self) -> Language {
        self.record.language()
    }

    /// Consume into the typed record.
    pub fn into_record(self) -> DocumentRecord {
        self.record
    }
}

/// Validate a raw record against the schema of `doc_type`.
///
/// Returns [`Error::Validation`] carrying every violation found.
pub fn validate(raw: &Value, doc_type: DocType) -> Result<ValidatedRecord> {
    let mut checker = Checker::new(doc_type);
    schema::check(&mut checker, raw);

    let errors = checker.finish();
    if !errors.is_empty() {
        log::debug!(
            "Validation of {} record failed with {} violation(s)",
            doc_type,
            errors.len()
        );
        return Err(Error::Validation(errors));
    }

    let record = match doc_type {
        DocType::JobDescription => DocumentRecord::JobDescription(typed(raw)?),
        DocType::AkaziCv => DocumentRecord::AkaziCv(typed(raw)?),
        DocType::Mc2iCv => DocumentRecord::Mc2iCv(typed(raw)?),
    };

    Ok(ValidatedRecord { record })
}

fn typed<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T> {
    serde_json::from_value(raw.clone()).map_err(|e| {
        Error::Validation(ValidationErrors {
            violations: vec![Violation {
                path: String::new(),
                constraint: Constraint::Type,
                message: e.to_string(),
            }],
        })
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal valid records shared by unit tests across the crate.

    use serde_json::{json, Value};

    pub fn metadata(document_type: &str, format_code: &str, lang: &str) -> Value {
        json!({
            "document_type": document_type,
            "format_code": format_code,
            "format_version": "1.0.0",
            "language_iso": lang,
            "generated_at": "2025-03-01T09:00:00Z",
            "generator": "unit-test"
        })
    }

    pub fn job_description(lang: &str) -> Value {
        let titles: [&str; 6] = if lang == "FRA" {
            [
                "Contexte de la mission",
                "Missions principales",
                "Livrables attendus",
                "Compétences requises",
                "Profil recherché",
                "Modalités",
            ]
        } else {
            [
                "Mission context",
                "Main responsibilities",
                "Expected deliverables",
                "Required skills",
                "Candidate profile",
                "Terms",
            ]
        };
        json!({
            "document_metadata": metadata("job_description", "AKAZI_JD", lang),
            "mission_title": "Data Governance Manager",
            "budget": {"text": "650 €/j"},
            "client": {"sector": "bancaire"},
            "description": {"sections": [
                {
                    "title": titles[0],
                    "content": "Rattaché au Data Governance Lead, vous piloterez la stratégie MDM.",
                    "formatting": {"bold_terms": ["Data Governance Lead", "stratégie MDM"]}
                },
                {
                    "title": titles[1],
                    "content": [
                        {
                            "text": "Pilotage Stratégique : Supervision des 7 streams",
                            "formatting": {"bold_spans": [{"start": 0, "end": 20}]},
                            "sub_items": ["Comités mensuels", {"text": "Reporting", "inferred": true}]
                        },
                        "Animation des data owners"
                    ]
                },
                {"title": titles[2], "content": ["Feuille de route MDM"]},
                {"title": titles[3], "content": ["SQL", {"text": "Collibra", "inferred": true}]},
                {"title": titles[4], "content": "10 ans d'expérience minimum."},
                {"title": titles[5], "content": ["Kigali, hybride"]}
            ]}
        })
    }

    pub fn akazi_cv() -> Value {
        json!({
            "document_metadata": metadata("cv", "AKAZI_V1", "FRA"),
            "header": {
                "initials": "J.D.",
                "title": "Chef de projet Data",
                "years_of_experience": "12 ans d'expérience"
            },
            "skills_table": {
                "functional_skills": {
                    "summary": "Pilotage de programmes data",
                    "details": ["Gouvernance", {"text": "Conduite du changement", "inferred": true}]
                },
                "technical_skills": {
                    "summary": "Écosystème Microsoft",
                    "details": ["Power BI"]
                },
                "education": [{"year": "2010", "degree": "Master", "institution": "ENSAE"}],
                "languages": [{"language": "Anglais", "level": "Courant", "inferred": true}]
            },
            "experiences": [
                {
                    "company": "Banque Populaire",
                    "period": {"start": "2021-03"},
                    "title": "Data Manager",
                    "mission_context": "Refonte du référentiel client.",
                    "tasks": ["Cadrage", "Recette"],
                    "technical_environment": [
                        "SQL Server",
                        {"technologies": "Azure", "inferred": true}
                    ]
                }
            ]
        })
    }

    pub fn mc2i_cv() -> Value {
        json!({
            "document_metadata": metadata("cv", "MC2I_V1", "FRA"),
            "experience_summary": [
                {"title": "Consultant MOA", "duration_months": 30},
                {"title": "Analyste", "duration_months": 20}
            ],
            "introduction": {
                "experience_summary": "Consultant fort de quatre ans d'expérience.",
                "technical_skills_summary": {
                    "text": "Maîtrise de SQL et Python.",
                    "formatting": {"bold_terms": ["SQL"]}
                },
                "functional_skills_summary": "Recette et pilotage.",
                "conclusion": {"text": "Disponible immédiatement."}
            },
            "languages": [{"language": "Anglais", "level": "B2"}],
            "education": [],
            "expertise": {"expertises": ["AMOA"], "masteries": ["Jira", "SQL"]},
            "professional_experiences": [
                {
                    "company": "Assureur",
                    "title": "Consultant AMOA",
                    "period": {"formatted": "2022 – 2024"},
                    "context": "Programme de transformation.",
                    "activities": ["Recueil des besoins"],
                    "functional_domains": [{"domain": "Assurance"}],
                    "technical_environment": ["Jira"]
                },
                {
                    "company": "Banque",
                    "activities": ["Recette"]
                }
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violations(raw: &Value, doc_type: DocType) -> ValidationErrors {
        match validate(raw, doc_type) {
            Err(Error::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_fixtures() {
        assert!(validate(&fixtures::job_description("FRA"), DocType::JobDescription).is_ok());
        assert!(validate(&fixtures::job_description("ENG"), DocType::JobDescription).is_ok());
        assert!(validate(&fixtures::akazi_cv(), DocType::AkaziCv).is_ok());
        assert!(validate(&fixtures::mc2i_cv(), DocType::Mc2iCv).is_ok());
    }

    #[test]
    fn test_validated_record_accessors() {
        let validated = validate(&fixtures::akazi_cv(), DocType::AkaziCv).unwrap();
        assert_eq!(validated.doc_type(), DocType::AkaziCv);
        assert_eq!(validated.language(), Language::French);
    }

    #[test]
    fn test_five_sections_rejected() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"].as_array_mut().unwrap().pop();
        let errors = violations(&raw, DocType::JobDescription);
        assert!(errors.has(Constraint::Cardinality));
        assert_eq!(errors.at("description.sections").len(), 1);
    }

    #[test]
    fn test_section_title_must_match_language() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][2]["title"] = json!("Expected deliverables");
        let errors = violations(&raw, DocType::JobDescription);
        assert!(errors.has(Constraint::SectionTitle));
        assert_eq!(errors.violations[0].path, "description.sections[2].title");
    }

    #[test]
    fn test_section_title_case_insensitive() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][0]["title"] = json!("  CONTEXTE DE LA MISSION ");
        assert!(validate(&raw, DocType::JobDescription).is_ok());
    }

    #[test]
    fn test_metadata_patterns() {
        let mut raw = fixtures::akazi_cv();
        raw["document_metadata"]["language_iso"] = json!("DEU");
        raw["document_metadata"]["format_version"] = json!("v1");
        raw["document_metadata"]["source_hash"] = json!("abc");
        raw["document_metadata"]["document_id"] = json!("not-a-uuid");
        raw["document_metadata"]["generated_at"] = json!("yesterday");
        let errors = violations(&raw, DocType::AkaziCv);
        assert!(errors.has(Constraint::Enum));
        assert_eq!(
            errors
                .violations
                .iter()
                .filter(|v| v.constraint == Constraint::Pattern)
                .count(),
            4
        );
    }

    #[test]
    fn test_metadata_accepts_valid_hash_and_uuid() {
        let mut raw = fixtures::akazi_cv();
        raw["document_metadata"]["source_hash"] = json!("a".repeat(64));
        raw["document_metadata"]["document_id"] = json!("67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert!(validate(&raw, DocType::AkaziCv).is_ok());
    }

    #[test]
    fn test_wrong_format_code() {
        let mut raw = fixtures::akazi_cv();
        raw["document_metadata"]["format_code"] = json!("MC2I_V1");
        let errors = violations(&raw, DocType::AkaziCv);
        assert_eq!(
            errors.at("document_metadata.format_code")[0].constraint,
            Constraint::Enum
        );
    }

    #[test]
    fn test_span_out_of_bounds() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][1]["content"][0]["formatting"]["bold_spans"] =
            json!([{"start": 40, "end": 400}]);
        let errors = violations(&raw, DocType::JobDescription);
        assert!(errors.has(Constraint::SpanBounds));
    }

    #[test]
    fn test_overlapping_spans_rejected() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][1]["content"][0]["formatting"]["bold_spans"] =
            json!([{"start": 0, "end": 10}, {"start": 5, "end": 15}]);
        let errors = violations(&raw, DocType::JobDescription);
        assert!(errors.has(Constraint::SpanOverlap));
    }

    #[test]
    fn test_adjacent_spans_accepted() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][1]["content"][0]["formatting"]["bold_spans"] =
            json!([{"start": 10, "end": 20}, {"start": 0, "end": 10}]);
        assert!(validate(&raw, DocType::JobDescription).is_ok());
    }

    #[test]
    fn test_terms_and_spans_exclusive() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][1]["content"][0]["formatting"]["bold_terms"] =
            json!(["Pilotage"]);
        let errors = violations(&raw, DocType::JobDescription);
        assert!(errors.has(Constraint::ExclusiveFormatting));
    }

    #[test]
    fn test_second_nesting_level_rejected() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][1]["content"][0]["sub_items"][1]["sub_items"] =
            json!(["too deep"]);
        let errors = violations(&raw, DocType::JobDescription);
        assert!(errors.has(Constraint::Nesting));
    }

    #[test]
    fn test_explicit_color_outside_palette() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][2]["content"][0] =
            json!({"text": "x", "formatting": {"color": "#00FF00"}});
        let errors = violations(&raw, DocType::JobDescription);
        assert!(errors.has(Constraint::Palette));
    }

    #[test]
    fn test_inferred_with_unrelated_color() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][2]["content"][0] =
            json!({"text": "x", "inferred": true, "formatting": {"color": "#C00000"}});
        let errors = violations(&raw, DocType::JobDescription);
        assert!(errors.has(Constraint::Provenance));

        raw["description"]["sections"][2]["content"][0] =
            json!({"text": "x", "inferred": true, "formatting": {"color": "#FF8C00"}});
        assert!(validate(&raw, DocType::JobDescription).is_ok());
    }

    #[test]
    fn test_empty_tasks_rejected() {
        let mut raw = fixtures::akazi_cv();
        raw["experiences"][0]["tasks"] = json!([]);
        let errors = violations(&raw, DocType::AkaziCv);
        assert_eq!(
            errors.at("experiences[0].tasks")[0].constraint,
            Constraint::Cardinality
        );
    }

    #[test]
    fn test_period_patterns() {
        let mut raw = fixtures::akazi_cv();
        raw["experiences"][0]["period"] =
            json!({"start": "2021-13", "end": "2020-01", "duration": "2 years"});
        let errors = violations(&raw, DocType::AkaziCv);
        assert_eq!(errors.len(), 2);

        raw["experiences"][0]["period"] = json!({"start": "2022-05", "end": "2021-01"});
        let errors = violations(&raw, DocType::AkaziCv);
        assert!(errors.has(Constraint::Range));
    }

    #[test]
    fn test_collects_all_violations() {
        let raw = json!({
            "document_metadata": {},
            "introduction": {},
            "expertise": {"expertises": []},
            "professional_experiences": []
        });
        let errors = violations(&raw, DocType::Mc2iCv);
        assert!(errors.len() > 5);
        assert!(errors.has(Constraint::Required));
        assert!(errors.has(Constraint::Cardinality));
    }

    #[test]
    fn test_display() {
        let errors = ValidationErrors {
            violations: vec![Violation {
                path: "mission_title".into(),
                constraint: Constraint::Required,
                message: "required field is missing".into(),
            }],
        };
        assert_eq!(errors.to_string(), "mission_title: required field is missing");
    }
}
