//! JSON serialization of rendered documents.

use crate::error::{Error, Result};
use crate::model::RenderedDocument;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a rendered document (IR plus profile snapshot) to JSON.
pub fn to_json(doc: &RenderedDocument, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Write(format!("JSON serialization error: {}", e)))
}

/// Parse a rendered document back from JSON.
pub fn from_json(json: &str) -> Result<RenderedDocument> {
    serde_json::from_str(json).map_err(|e| Error::Parse(format!("invalid IR document: {}", e)))
}
