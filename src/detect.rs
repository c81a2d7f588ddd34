//! Document type detection from a record's key signature.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The closed set of document types this crate can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    /// Job posting (six fixed sections, budget line)
    JobDescription,
    /// CV with a flat skills table and experience grid
    AkaziCv,
    /// Competency dossier with introduction and expertise
    Mc2iCv,
}

impl DocType {
    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::JobDescription => "job_description",
            DocType::AkaziCv => "akazi_cv",
            DocType::Mc2iCv => "mc2i_cv",
        }
    }

    /// All document types, in detection priority order.
    pub fn all() -> &'static [DocType] {
        &[DocType::JobDescription, DocType::AkaziCv, DocType::Mc2iCv]
    }

    /// Value expected in `document_metadata.document_type`.
    pub fn metadata_type(&self) -> &'static str {
        match self {
            DocType::JobDescription => "job_description",
            DocType::AkaziCv | DocType::Mc2iCv => "cv",
        }
    }

    /// Value expected in `document_metadata.format_code`.
    pub fn metadata_format_code(&self) -> &'static str {
        match self {
            DocType::JobDescription => "AKAZI_JD",
            DocType::AkaziCv => "AKAZI_V1",
            DocType::Mc2iCv => "MC2I_V1",
        }
    }

    /// Top-level keys that must all be present for this type to match.
    pub fn signature(&self) -> &'static [&'static str] {
        match self {
            DocType::JobDescription => &[
                "document_metadata",
                "mission_title",
                "budget",
                "description",
            ],
            DocType::AkaziCv => &["document_metadata", "header", "skills_table", "experiences"],
            DocType::Mc2iCv => &[
                "document_metadata",
                "introduction",
                "expertise",
                "professional_experiences",
            ],
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DocType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Other(format!("Unknown document type: {}", s)))
    }
}

/// Classify a raw record into a document type.
///
/// Signatures are checked in priority order. When several match, the one
/// with the largest key set wins; equally large matches are reported as
/// [`Error::AmbiguousSchema`]. A record matching nothing yields
/// [`Error::UnrecognizedSchema`].
///
/// # Example
/// ```
/// use housestyle::detect::{detect, DocType};
/// use serde_json::json;
///
/// let raw = json!({
///     "document_metadata": {},
///     "mission_title": "Data Lead",
///     "budget": {"text": "650 €/j"},
///     "description": {"sections": []}
/// });
/// assert_eq!(detect(&raw).unwrap(), DocType::JobDescription);
/// ```
pub fn detect(raw: &Value) -> Result<DocType> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            log::warn!("Type detection failed: record is not a mapping");
            return Err(Error::UnrecognizedSchema { keys: Vec::new() });
        }
    };

    let matches: Vec<DocType> = DocType::all()
        .iter()
        .copied()
        .filter(|t| t.signature().iter().all(|key| obj.contains_key(*key)))
        .collect();

    let best = matches.iter().map(|t| t.signature().len()).max();
    let Some(best) = best else {
        let keys: Vec<String> = obj.keys().cloned().collect();
        log::warn!("Unrecognized record, available keys: {:?}", keys);
        return Err(Error::UnrecognizedSchema { keys });
    };

    let top: Vec<DocType> = matches
        .into_iter()
        .filter(|t| t.signature().len() == best)
        .collect();

    if top.len() > 1 {
        return Err(Error::AmbiguousSchema { candidates: top });
    }

    log::debug!("Detected document type {}", top[0]);
    Ok(top[0])
}

/// Check whether a raw record matches any declared schema.
pub fn is_recognized(raw: &Value) -> bool {
    detect(raw).is_ok()
}
