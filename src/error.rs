//! Error types for the housestyle library.

use crate::detect::DocType;
use crate::validate::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for housestyle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while detecting, validating or rendering a record.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading inputs or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input could not be parsed as JSON or YAML.
    #[error("Input parsing error: {0}")]
    Parse(String),

    /// The input file extension is not a supported record format.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// No declared schema matches the record's top-level keys.
    #[error("Unrecognized schema (top-level keys: {})", .keys.join(", "))]
    UnrecognizedSchema {
        /// Top-level keys found in the record
        keys: Vec<String>,
    },

    /// Two or more schemas match the record equally well.
    #[error("Ambiguous schema: record matches {}", format_candidates(.candidates))]
    AmbiguousSchema {
        /// Document types that matched with equal specificity
        candidates: Vec<DocType>,
    },

    /// The record violates one or more schema constraints.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// No generator is registered for the requested (doc_type, format) pair.
    #[error("Unsupported format {format} for {doc_type}: {reason}")]
    UnsupportedFormat {
        /// Detected document type
        doc_type: DocType,
        /// Requested format code
        format: String,
        /// Why the pair was rejected
        reason: String,
    },

    /// The generator rejected content that should have been caught upstream.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A bullet item nests deeper than one level of sub-items.
    #[error("Unsupported nesting at {path}: depth {depth} exceeds one sub-item level")]
    UnsupportedNesting {
        /// Location of the offending item
        path: String,
        /// Nesting depth found (0 = top level)
        depth: usize,
    },

    /// A generator produced output lacking a block it must always emit.
    #[error("Missing required block: {0}")]
    MissingRequiredBlock(String),

    /// A single item exceeded its time budget.
    #[error("Item timed out after {0:?}")]
    Timeout(Duration),

    /// The batch was cancelled before this item started.
    #[error("Cancelled before start")]
    Cancelled,

    /// The document writer failed to persist an artifact.
    #[error("Write error: {0}")]
    Write(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

fn format_candidates(candidates: &[DocType]) -> String {
    candidates
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Machine-readable error classification used in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    Parse,
    UnsupportedInput,
    UnrecognizedSchema,
    AmbiguousSchema,
    Validation,
    UnsupportedFormat,
    Render,
    UnsupportedNesting,
    MissingRequiredBlock,
    Timeout,
    Cancelled,
    Write,
    Other,
}

/// Pipeline stage in which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Loading or parsing the raw input
    Input,
    /// Type detection
    Detection,
    /// Schema validation
    Validation,
    /// Generator resolution
    Resolution,
    /// Rendering to IR
    Render,
    /// Scheduling (timeouts, cancellation)
    Scheduling,
    /// Artifact writing
    Output,
}

impl Stage {
    /// Whether the stage runs before any generator is invoked.
    pub fn is_pre_render(self) -> bool {
        matches!(self, Stage::Input | Stage::Detection | Stage::Validation)
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Parse(_) => ErrorKind::Parse,
            Error::UnsupportedInput(_) => ErrorKind::UnsupportedInput,
            Error::UnrecognizedSchema { .. } => ErrorKind::UnrecognizedSchema,
            Error::AmbiguousSchema { .. } => ErrorKind::AmbiguousSchema,
            Error::Validation(_) => ErrorKind::Validation,
            Error::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Error::Render(_) => ErrorKind::Render,
            Error::UnsupportedNesting { .. } => ErrorKind::UnsupportedNesting,
            Error::MissingRequiredBlock(_) => ErrorKind::MissingRequiredBlock,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Write(_) => ErrorKind::Write,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// The stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Io(_) | Error::Parse(_) | Error::UnsupportedInput(_) => Stage::Input,
            Error::UnrecognizedSchema { .. } | Error::AmbiguousSchema { .. } => Stage::Detection,
            Error::Validation(_) => Stage::Validation,
            Error::UnsupportedFormat { .. } => Stage::Resolution,
            Error::Render(_)
            | Error::UnsupportedNesting { .. }
            | Error::MissingRequiredBlock(_)
            | Error::Other(_) => Stage::Render,
            Error::Timeout(_) | Error::Cancelled => Stage::Scheduling,
            Error::Write(_) => Stage::Output,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
