//! Loading raw records from JSON or YAML.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::Path;

/// Serialization of a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl InputFormat {
    /// Input format for a file extension (case-insensitive, no leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(InputFormat::Json),
            "yaml" | "yml" => Some(InputFormat::Yaml),
            _ => None,
        }
    }

    /// Input format for a path, by extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                Error::UnsupportedInput(format!(
                    "{} (expected .json, .yaml or .yml)",
                    path.display()
                ))
            })
    }
}

/// Parse a raw record from text.
///
/// YAML input is converted to the same JSON value model, so detection and
/// validation see one representation regardless of the source syntax.
pub fn load_str(text: &str, format: InputFormat) -> Result<Value> {
    let value = match format {
        InputFormat::Json => serde_json::from_str(text)?,
        InputFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(value)
}

/// Read and parse a raw record from a file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    log::debug!("Loaded {} ({:?}, {} bytes)", path.display(), format, text.len());
    load_str(&text, format)
}
