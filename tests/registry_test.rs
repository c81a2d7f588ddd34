//! Integration tests for the generator registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use housestyle::error::Result;
use housestyle::generate::{Generator, GeneratorRegistry, RenderContext};
use housestyle::model::{Block, BlockStyle, Role, Run};
use housestyle::{
    detect, load_file, validate, DocType, Engine, Error, FormatCode, RenderOptions,
    ValidatedRecord,
};

/// Mock generator for testing.
struct MockGenerator {
    name: &'static str,
    doc_type: DocType,
    blocks: usize,
    calls: AtomicUsize,
}

impl MockGenerator {
    fn new(name: &'static str, doc_type: DocType, blocks: usize) -> Self {
        Self {
            name,
            doc_type,
            blocks,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Generator for MockGenerator {
    fn name(&self) -> &str {
        self.name
    }

    fn doc_type(&self) -> DocType {
        self.doc_type
    }

    fn render(&self, _record: &ValidatedRecord, ctx: &RenderContext<'_>) -> Result<Vec<Block>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let style = BlockStyle::new(Role::Body, ctx.profile.font.body_size);
        Ok((0..self.blocks)
            .map(|i| {
                Block::paragraph(
                    style.clone(),
                    vec![Run::new(
                        format!("{} {} {}", self.name, ctx.options.placeholder, i),
                        ctx.profile.palette.body,
                    )],
                )
            })
            .collect())
    }
}

fn akazi_record() -> ValidatedRecord {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cv_akazi.json");
    let raw = load_file(path).unwrap();
    validate(&raw, detect(&raw).unwrap()).unwrap()
}

#[test]
fn test_registry_defaults() {
    let registry = GeneratorRegistry::with_defaults();

    assert_eq!(
        registry.formats(),
        vec![
            FormatCode::JdAkaziFr,
            FormatCode::JdAkaziEn,
            FormatCode::CvAkazi,
            FormatCode::CvMc2i
        ]
    );
    assert!(registry.get_by_name("akazi_cv").is_some());
    assert!(registry.get_by_name("MC2I_CV").is_some());
    assert!(registry.get_by_name("docx").is_none());
}

#[test]
fn test_registry_custom_generator() {
    let mut registry = GeneratorRegistry::new();
    let mock = Arc::new(MockGenerator::new("mock", DocType::AkaziCv, 2));
    registry.register(FormatCode::CvAkazi, mock.clone()).unwrap();

    assert!(registry.supports(FormatCode::CvAkazi));
    assert!(!registry.supports(FormatCode::CvMc2i));

    let options = RenderOptions::new().with_placeholder("N/A");
    let doc = registry
        .render(&akazi_record(), FormatCode::CvAkazi, &options)
        .unwrap();
    assert_eq!(doc.block_count(), 2);
    assert_eq!(doc.blocks[1].plain_text(), "mock N/A 1");
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_registry_rejects_mismatched_type() {
    let mut registry = GeneratorRegistry::new();
    let mock = Arc::new(MockGenerator::new("mock", DocType::Mc2iCv, 1));
    assert!(matches!(
        registry.register(FormatCode::CvAkazi, mock),
        Err(Error::UnsupportedFormat { .. })
    ));
    assert!(registry.formats().is_empty());
}

#[test]
fn test_registry_unregistered_format() {
    let registry = GeneratorRegistry::new();
    assert!(matches!(
        registry.render(&akazi_record(), FormatCode::CvAkazi, &RenderOptions::default()),
        Err(Error::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_empty_output_is_a_defect() {
    let mut registry = GeneratorRegistry::new();
    registry
        .register(
            FormatCode::CvAkazi,
            Arc::new(MockGenerator::new("empty", DocType::AkaziCv, 0)),
        )
        .unwrap();

    assert!(matches!(
        registry.render(&akazi_record(), FormatCode::CvAkazi, &RenderOptions::default()),
        Err(Error::MissingRequiredBlock(_))
    ));
}

#[test]
fn test_engine_with_custom_registry() {
    let mock = Arc::new(MockGenerator::new("mock", DocType::AkaziCv, 1));
    let mut registry = GeneratorRegistry::new();
    registry.register(FormatCode::CvAkazi, mock.clone()).unwrap();
    let engine = Engine::new().with_registry(registry);

    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cv_akazi.json");
    let raw = load_file(path).unwrap();
    for _ in 0..3 {
        engine.render_cached(&raw, FormatCode::CvAkazi).unwrap();
    }
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}
