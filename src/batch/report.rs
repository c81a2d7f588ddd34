//! Batch run report.

use crate::cache::CacheStatus;
use crate::detect::DocType;
use crate::error::{Error, ErrorKind, Result, Stage};
use crate::model::RenderedDocument;
use crate::profile::FormatCode;
use crate::validate::Violation;
use serde::Serialize;
use std::sync::Arc;

/// Structured description of a failed pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    /// Error classification
    pub kind: ErrorKind,
    /// Pipeline stage that failed
    pub stage: Stage,
    /// Human-readable message
    pub message: String,
    /// Schema violations, for validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl From<&Error> for ErrorDetail {
    fn from(err: &Error) -> Self {
        let violations = match err {
            Error::Validation(errors) => errors.violations.clone(),
            _ => Vec::new(),
        };
        Self {
            kind: err.kind(),
            stage: err.stage(),
            message: err.to_string(),
            violations,
        }
    }
}

/// Result of one (record, format) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The pair rendered.
    Success {
        /// Whether the document came from the cache
        cache: CacheStatus,
        /// Number of blocks rendered
        blocks: usize,
        /// Rendered document handle
        #[serde(skip)]
        document: Arc<RenderedDocument>,
    },
    /// The pair failed; siblings are unaffected.
    Failure {
        /// What went wrong
        error: ErrorDetail,
    },
}

/// Outcome of one (record, format) pair, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct PairOutcome {
    /// Index of the item in the batch input
    pub index: usize,
    /// Item name (usually the source path)
    pub item: String,
    /// Artifact base name, unique within the batch
    pub artifact: String,
    /// Target format, unknown when detection failed before expansion
    pub format: Option<FormatCode>,
    /// Detected document type
    pub doc_type: Option<DocType>,
    /// Success or failure
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Wall time spent on this pair
    pub elapsed_ms: u64,
}

impl PairOutcome {
    /// Check if the pair rendered.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Rendered document, for successful pairs.
    pub fn document(&self) -> Option<&Arc<RenderedDocument>> {
        match &self.outcome {
            Outcome::Success { document, .. } => Some(document),
            Outcome::Failure { .. } => None,
        }
    }

    /// Error detail, for failed pairs.
    pub fn error(&self) -> Option<&ErrorDetail> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { error } => Some(error),
        }
    }

    /// Stable artifact stem, e.g. `posting.JD-AKAZI-FR`.
    pub fn artifact_stem(&self) -> String {
        match self.format {
            Some(format) => format!("{}.{}", self.artifact, format),
            None => self.artifact.clone(),
        }
    }
}

/// Ordered outcomes plus aggregate counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Number of input items
    pub items: usize,
    /// Pairs rendered
    pub succeeded: usize,
    /// Pairs failed
    pub failed: usize,
    /// Successful pairs served from the cache
    pub cache_hits: usize,
    /// Pairs skipped because the batch was cancelled
    pub cancelled: usize,
    /// Total wall time
    pub elapsed_ms: u64,
    /// Per-pair outcomes, in input order
    pub outcomes: Vec<PairOutcome>,
}

impl BatchReport {
    /// Build a report from ordered outcomes.
    pub fn new(items: usize, outcomes: Vec<PairOutcome>, elapsed_ms: u64) -> Self {
        let mut report = Self {
            items,
            elapsed_ms,
            ..Default::default()
        };
        for outcome in &outcomes {
            match &outcome.outcome {
                Outcome::Success { cache, .. } => {
                    report.succeeded += 1;
                    if *cache == CacheStatus::Hit {
                        report.cache_hits += 1;
                    }
                }
                Outcome::Failure { error } => {
                    report.failed += 1;
                    if error.kind == ErrorKind::Cancelled {
                        report.cancelled += 1;
                    }
                }
            }
        }
        report.outcomes = outcomes;
        report
    }

    /// Total number of pairs.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Failed pairs, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &PairOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Process exit code for this run.
    ///
    /// In strict mode any pair that failed before rendering (input,
    /// detection or validation) yields 1. Render-stage failures are isolated
    /// and never change the exit code.
    pub fn exit_code(&self, strict: bool) -> i32 {
        let pre_render = self
            .failures()
            .filter_map(PairOutcome::error)
            .any(|e| e.stage.is_pre_render());
        if strict && pre_render {
            1
        } else {
            0
        }
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Write(format!("report serialization error: {}", e)))
    }
}
