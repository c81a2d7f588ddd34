//! Typed input records, one per document type.
//!
//! Records are produced by [`crate::validate::validate`] from raw JSON/YAML
//! values once every structural constraint has been checked, so the types
//! here only describe shape, not validity.

use super::content::null_as_default;
use super::{
    BulletEntry, Certification, Domain, Education, Formatting, LanguageSkill, Period, RichText,
    TechEntry,
};
use crate::detect::DocType;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Document language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// French
    #[serde(rename = "FRA")]
    French,
    /// English
    #[serde(rename = "ENG")]
    English,
}

impl Language {
    /// ISO 639-2 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::French => "FRA",
            Language::English => "ENG",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FRA" => Ok(Language::French),
            "ENG" => Ok(Language::English),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

/// Metadata block carried by every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// `job_description` or `cv`
    pub document_type: String,
    /// Input schema code (e.g. `AKAZI_JD`)
    pub format_code: String,
    /// Schema version (semver)
    pub format_version: String,
    /// Document language
    pub language_iso: Language,
    /// When the record was produced
    pub generated_at: DateTime<FixedOffset>,
    /// Producer identifier
    pub generator: String,
    /// SHA-256 of the source material
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    /// Stable document identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Job description
// ---------------------------------------------------------------------------

/// A job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionRecord {
    /// Common metadata
    pub document_metadata: DocumentMetadata,
    /// Mission title
    pub mission_title: String,
    /// Budget line
    pub budget: Budget,
    /// Anonymized client description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    /// The six fixed sections
    pub description: Description,
}

/// Budget information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget text (e.g. "650 €/j")
    #[serde(default)]
    pub text: Option<String>,
    /// Deduced rather than quoted from the source
    #[serde(default, deserialize_with = "null_as_default")]
    pub inferred: bool,
}

/// Client information used for the anonymized client line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Business sector
    pub sector: String,
}

/// Description body of a job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Ordered sections
    pub sections: Vec<Section>,
}

/// One job posting section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Declared title (checked against the localized vocabulary)
    pub title: String,
    /// Paragraph or bullet list
    pub content: SectionContent,
    /// Formatting for paragraph content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<Formatting>,
}

/// Section body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionContent {
    /// A single paragraph
    Paragraph(String),
    /// A bullet list
    Bullets(Vec<BulletEntry>),
}

// ---------------------------------------------------------------------------
// CV style A
// ---------------------------------------------------------------------------

/// CV with a skills table and experience grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AkaziCvRecord {
    /// Common metadata
    pub document_metadata: DocumentMetadata,
    /// Title block
    pub header: AkaziHeader,
    /// Skills table
    pub skills_table: SkillsTable,
    /// Missions, most recent first
    pub experiences: Vec<AkaziExperience>,
}

/// Title block of a style A CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AkaziHeader {
    /// Consultant initials
    pub initials: String,
    /// Job title
    pub title: String,
    /// Experience label (e.g. "12 ans d'expérience")
    pub years_of_experience: String,
    /// Daily rate
    #[serde(default)]
    pub daily_rate: Option<String>,
}

/// Skills table of a style A CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsTable {
    /// Functional skills
    pub functional_skills: SkillGroup,
    /// Technical skills
    pub technical_skills: SkillGroup,
    /// Diplomas
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    /// Certifications
    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: Vec<Certification>,
    /// Spoken languages
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<LanguageSkill>,
}

/// A summary paragraph followed by detail bullets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    /// Summary paragraph
    pub summary: RichText,
    /// Detail bullets
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Vec<BulletEntry>,
}

/// One mission of a style A CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AkaziExperience {
    /// Client or employer
    #[serde(default)]
    pub company: Option<String>,
    /// Mission period
    #[serde(default)]
    pub period: Option<Period>,
    /// Position held
    #[serde(default)]
    pub title: Option<String>,
    /// Mission context paragraph
    #[serde(default)]
    pub mission_context: Option<String>,
    /// Tasks performed
    pub tasks: Vec<BulletEntry>,
    /// Technologies used
    #[serde(default, deserialize_with = "null_as_default")]
    pub technical_environment: Vec<TechEntry>,
}

// ---------------------------------------------------------------------------
// CV style B
// ---------------------------------------------------------------------------

/// Competency dossier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mc2iCvRecord {
    /// Common metadata
    pub document_metadata: DocumentMetadata,
    /// Consultant identity line
    #[serde(default)]
    pub consultant: Option<Consultant>,
    /// Past positions with durations
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience_summary: Vec<ExperienceSummary>,
    /// Four-paragraph introduction
    pub introduction: Introduction,
    /// Spoken languages
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<LanguageSkill>,
    /// Diplomas
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    /// Expertise and tool mastery
    pub expertise: Expertise,
    /// Missions, most recent first
    pub professional_experiences: Vec<Mc2iExperience>,
}

/// Consultant identity line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consultant {
    /// Headline (e.g. "CONSULTANT DATA")
    #[serde(default)]
    pub headline: Option<String>,
    /// Title overriding the first summary entry
    #[serde(default)]
    pub title: Option<String>,
}

/// One past position and its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSummary {
    /// Position title
    pub title: String,
    /// Length in months
    pub duration_months: u32,
}

/// Introduction paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Introduction {
    /// Career overview
    pub experience_summary: RichText,
    /// Technical skills overview
    pub technical_skills_summary: RichText,
    /// Functional skills overview
    pub functional_skills_summary: RichText,
    /// Closing paragraph
    #[serde(default)]
    pub conclusion: Option<RichText>,
}

/// Expertise block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expertise {
    /// Areas of expertise
    pub expertises: Vec<BulletEntry>,
    /// Tools and technologies mastered
    #[serde(default, deserialize_with = "null_as_default")]
    pub masteries: Vec<String>,
}

/// One mission of a style B CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mc2iExperience {
    /// Client or employer
    #[serde(default)]
    pub company: Option<String>,
    /// Position held
    #[serde(default)]
    pub title: Option<String>,
    /// Mission period
    #[serde(default)]
    pub period: Option<Period>,
    /// Context paragraph
    #[serde(default)]
    pub context: Option<String>,
    /// Activities performed
    pub activities: Vec<BulletEntry>,
    /// Functional domains
    #[serde(default, deserialize_with = "null_as_default")]
    pub functional_domains: Vec<Domain>,
    /// Technologies used
    #[serde(default, deserialize_with = "null_as_default")]
    pub technical_environment: Vec<TechEntry>,
}

// ---------------------------------------------------------------------------
// Closed record variant
// ---------------------------------------------------------------------------

/// A validated record of any supported type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentRecord {
    /// Job posting
    JobDescription(JobDescriptionRecord),
    /// Style A CV
    AkaziCv(AkaziCvRecord),
    /// Style B CV
    Mc2iCv(Mc2iCvRecord),
}

impl DocumentRecord {
    /// Document type of this record.
    pub fn doc_type(&self) -> DocType {
        match self {
            DocumentRecord::JobDescription(_) => DocType::JobDescription,
            DocumentRecord::AkaziCv(_) => DocType::AkaziCv,
            DocumentRecord::Mc2iCv(_) => DocType::Mc2iCv,
        }
    }

    /// Metadata block.
    pub fn metadata(&self) -> &DocumentMetadata {
        match self {
            DocumentRecord::JobDescription(r) => &r.document_metadata,
            DocumentRecord::AkaziCv(r) => &r.document_metadata,
            DocumentRecord::Mc2iCv(r) => &r.document_metadata,
        }
    }

    /// Declared language.
    pub fn language(&self) -> Language {
        self.metadata().language_iso
    }
}
