//! # housestyle
//!
//! Schema-driven rendering of job postings and CVs into a style-annotated
//! document IR.
//!
//! A raw record (JSON or YAML) is classified by its key signature, validated
//! against the schema of its document type, and rendered by the generator of
//! the requested house style. The result is an ordered list of blocks and
//! styled runs plus a snapshot of the style's visual constants, ready for a
//! document writer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use housestyle::{render_file, render, FormatCode};
//!
//! fn main() -> housestyle::Result<()> {
//!     let doc = render_file("posting.yaml", FormatCode::JdAkaziFr)?;
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Closed document types**: job postings and two CV styles, detected once
//! - **Structured validation**: every violation reported with its path
//! - **Bold terms and spans**: resolved into alternating styled runs
//! - **Provenance colors**: deduced content is visibly marked
//! - **Batch processing**: isolated pairs on a Rayon pool, ordered report
//! - **Content-addressed cache**: identical renders are computed once

pub mod batch;
pub mod cache;
pub mod detect;
pub mod engine;
pub mod error;
pub mod generate;
pub mod load;
pub mod model;
pub mod profile;
pub mod render;
pub mod validate;
pub mod writer;

// Re-export commonly used types
pub use batch::{process, BatchItem, BatchOptions, BatchReport, CancellationToken, PairOutcome};
pub use cache::{CacheKey, CacheStatus, RenderCache};
pub use detect::{detect, DocType};
pub use engine::Engine;
pub use error::{Error, ErrorKind, Result, Stage};
pub use generate::{Generator, GeneratorRegistry, RenderContext};
pub use load::{load_file, load_str, InputFormat};
pub use model::{
    Block, BlockKind, BlockStyle, BulletEntry, BulletItem, Color, DocumentRecord, Formatting,
    Language, ListItem, RenderedDocument, Role, Run,
};
pub use profile::{FormatCode, FormatProfile};
pub use render::{JsonFormat, RenderOptions};
pub use validate::{validate, Constraint, ValidatedRecord, ValidationErrors, Violation};
pub use writer::{DocumentWriter, JsonIrWriter, RetryPolicy, WriterPool};

use serde_json::Value;
use std::path::Path;

/// Load, detect, validate and render a record file.
///
/// # Example
///
/// ```no_run
/// use housestyle::{render_file, FormatCode};
///
/// let doc = render_file("cv.json", FormatCode::CvMc2i).unwrap();
/// println!("Blocks: {}", doc.block_count());
/// ```
pub fn render_file<P: AsRef<Path>>(path: P, format: FormatCode) -> Result<RenderedDocument> {
    let raw = load_file(path)?;
    render_value(&raw, format)
}

/// Detect, validate and render an in-memory record.
pub fn render_value(raw: &Value, format: FormatCode) -> Result<RenderedDocument> {
    render_value_with_options(raw, format, &RenderOptions::default())
}

/// Detect, validate and render an in-memory record with custom options.
///
/// # Example
///
/// ```no_run
/// use housestyle::{load_file, render_value_with_options, FormatCode, RenderOptions};
///
/// let raw = load_file("posting.json").unwrap();
/// let options = RenderOptions::new().with_placeholder("N/A");
/// let doc = render_value_with_options(&raw, FormatCode::JdAkaziEn, &options).unwrap();
/// ```
pub fn render_value_with_options(
    raw: &Value,
    format: FormatCode,
    options: &RenderOptions,
) -> Result<RenderedDocument> {
    let doc_type = detect(raw)?;
    let record = validate(raw, doc_type)?;
    GeneratorRegistry::with_defaults().render(&record, format, options)
}

/// Render a record file to JSON IR.
///
/// # Example
///
/// ```no_run
/// use housestyle::{to_json, FormatCode, JsonFormat};
///
/// let json = to_json("cv.yaml", FormatCode::CvAkazi, JsonFormat::Pretty).unwrap();
/// std::fs::write("cv.CV-AKAZI.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: FormatCode, json: JsonFormat) -> Result<String> {
    let doc = render_file(path, format)?;
    render::to_json(&doc, json)
}

/// Render a record file to a plain text preview.
pub fn to_text<P: AsRef<Path>>(path: P, format: FormatCode) -> Result<String> {
    let doc = render_file(path, format)?;
    Ok(render::to_text(&doc, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::fixtures;

    #[test]
    fn test_render_value() {
        let doc = render_value(&fixtures::job_description("FRA"), FormatCode::JdAkaziFr).unwrap();
        assert_eq!(doc.doc_type, DocType::JobDescription);
        assert_eq!(doc.language, Language::French);
        assert_eq!(doc.profile.font.name, "Century Gothic");
    }

    #[test]
    fn test_render_value_wrong_format() {
        let result = render_value(&fixtures::akazi_cv(), FormatCode::CvMc2i);
        assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_render_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.json");
        std::fs::write(&path, fixtures::mc2i_cv().to_string()).unwrap();

        let json = to_json(&path, FormatCode::CvMc2i, JsonFormat::Compact).unwrap();
        assert!(json.contains("\"CV-MC2I\""));
        let text = to_text(&path, FormatCode::CvMc2i).unwrap();
        assert!(text.starts_with("CONSULTANT"));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            render_file("cv.docx", FormatCode::CvAkazi),
            Err(Error::UnsupportedInput(_))
        ));
    }
}
