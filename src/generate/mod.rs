//! Generator registry providing one renderer per output format.
//!
//! Every format code maps to a [`FormatProfile`] and a [`Generator`]. The
//! registry is filled once at startup and only read afterwards, so it can be
//! shared across batch workers behind an `Arc`.
//!
//! # Example
//!
//! ```no_run
//! use housestyle::generate::GeneratorRegistry;
//! use housestyle::profile::FormatCode;
//! use housestyle::render::RenderOptions;
//! use housestyle::{detect, validate};
//!
//! fn main() -> housestyle::Result<()> {
//!     let raw = housestyle::load_file("posting.yaml")?;
//!     let doc_type = detect(&raw)?;
//!     let record = validate(&raw, doc_type)?;
//!
//!     let registry = GeneratorRegistry::with_defaults();
//!     let doc = registry.render(&record, FormatCode::JdAkaziFr, &RenderOptions::default())?;
//!     println!("{} blocks", doc.block_count());
//!     Ok(())
//! }
//! ```

mod akazi_cv;
pub(crate) mod blocks;
mod job_description;
mod mc2i_cv;

pub use akazi_cv::AkaziCvGenerator;
pub use job_description::JobDescriptionGenerator;
pub use mc2i_cv::Mc2iCvGenerator;

use crate::detect::DocType;
use crate::error::{Error, Result};
use crate::model::{Block, Language, RenderedDocument};
use crate::profile::{vocabulary, FormatCode, FormatProfile, Vocabulary};
use crate::render::RenderOptions;
use crate::validate::ValidatedRecord;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a generator may read while rendering one document.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Visual constants of the target format
    pub profile: &'a FormatProfile,

    /// Localized vocabulary for the document language
    pub vocabulary: &'static Vocabulary,

    /// Document language
    pub language: Language,

    /// Caller options
    pub options: &'a RenderOptions,
}

/// Trait for format generators.
///
/// Implement this trait to add a new house style. Rendering must be a pure
/// function of the record and context: the same inputs always produce the
/// same blocks.
pub trait Generator: Send + Sync {
    /// Get the name of this generator.
    fn name(&self) -> &str;

    /// The document type this generator accepts.
    fn doc_type(&self) -> DocType;

    /// Render a validated record into ordered blocks.
    fn render(&self, record: &ValidatedRecord, ctx: &RenderContext<'_>) -> Result<Vec<Block>>;
}

struct Registration {
    profile: FormatProfile,
    generator: Arc<dyn Generator>,
}

/// Registry of generators keyed by format code.
pub struct GeneratorRegistry {
    formats: HashMap<FormatCode, Registration>,
    by_name: HashMap<String, Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in formats.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let job: Arc<dyn Generator> = Arc::new(JobDescriptionGenerator::new());
        let entries: [(FormatCode, Arc<dyn Generator>); 4] = [
            (FormatCode::JdAkaziFr, job.clone()),
            (FormatCode::JdAkaziEn, job),
            (FormatCode::CvAkazi, Arc::new(AkaziCvGenerator::new())),
            (FormatCode::CvMc2i, Arc::new(Mc2iCvGenerator::new())),
        ];
        for (code, generator) in entries {
            registry.insert(code, FormatProfile::for_code(code), generator);
        }
        registry
    }

    /// Register a generator for a format code with the built-in profile.
    ///
    /// Fails when the generator accepts a different document type than the
    /// format code serves.
    pub fn register(&mut self, code: FormatCode, generator: Arc<dyn Generator>) -> Result<()> {
        self.register_with_profile(FormatProfile::for_code(code), generator)
    }

    /// Register a generator with a custom profile.
    pub fn register_with_profile(
        &mut self,
        profile: FormatProfile,
        generator: Arc<dyn Generator>,
    ) -> Result<()> {
        let code = profile.code;
        if generator.doc_type() != code.doc_type() {
            return Err(Error::UnsupportedFormat {
                doc_type: generator.doc_type(),
                format: code.to_string(),
                reason: format!("format serves {}", code.doc_type()),
            });
        }
        self.insert(code, profile, generator);
        Ok(())
    }

    fn insert(&mut self, code: FormatCode, profile: FormatProfile, generator: Arc<dyn Generator>) {
        log::debug!("Registering generator '{}' for {}", generator.name(), code);
        self.by_name
            .insert(generator.name().to_lowercase(), generator.clone());
        self.formats
            .insert(code, Registration { profile, generator });
    }

    /// Get a generator by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Generator>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if a format code is registered.
    pub fn supports(&self, code: FormatCode) -> bool {
        self.formats.contains_key(&code)
    }

    /// Registered format codes, in canonical order.
    pub fn formats(&self) -> Vec<FormatCode> {
        FormatCode::all()
            .iter()
            .copied()
            .filter(|code| self.supports(*code))
            .collect()
    }

    /// Profile registered for a format code.
    pub fn profile(&self, code: FormatCode) -> Option<&FormatProfile> {
        self.formats.get(&code).map(|r| &r.profile)
    }

    /// Resolve the generator for a (doc_type, format) pair.
    pub fn resolve(&self, doc_type: DocType, code: FormatCode) -> Result<Arc<dyn Generator>> {
        let registration = self.formats.get(&code).ok_or_else(|| Error::UnsupportedFormat {
            doc_type,
            format: code.to_string(),
            reason: "no generator registered".into(),
        })?;

        if registration.generator.doc_type() != doc_type {
            return Err(Error::UnsupportedFormat {
                doc_type,
                format: code.to_string(),
                reason: format!("format renders {}", registration.generator.doc_type()),
            });
        }
        Ok(registration.generator.clone())
    }

    /// Formats a validated record can be rendered to.
    pub fn compatible_formats(&self, record: &ValidatedRecord) -> Vec<FormatCode> {
        self.formats()
            .into_iter()
            .filter(|code| code.doc_type() == record.doc_type())
            .filter(|code| {
                code.fixed_language()
                    .map_or(true, |lang| lang == record.language())
            })
            .collect()
    }

    /// Render a validated record to the given format.
    pub fn render(
        &self,
        record: &ValidatedRecord,
        code: FormatCode,
        options: &RenderOptions,
    ) -> Result<RenderedDocument> {
        let doc_type = record.doc_type();
        let generator = self.resolve(doc_type, code)?;
        let language = record.language();

        if let Some(fixed) = code.fixed_language() {
            if fixed != language {
                return Err(Error::UnsupportedFormat {
                    doc_type,
                    format: code.to_string(),
                    reason: format!("format is {} only, record is {}", fixed, language),
                });
            }
        }

        let profile = self
            .profile(code)
            .ok_or_else(|| Error::Other(format!("No profile for {}", code)))?;
        let ctx = RenderContext {
            profile,
            vocabulary: vocabulary(language),
            language,
            options,
        };

        let blocks = generator.render(record, &ctx).map_err(|e| {
            if matches!(e, Error::MissingRequiredBlock(_)) {
                log::error!("Generator '{}' defect: {}", generator.name(), e);
            }
            e
        })?;

        if blocks.is_empty() {
            let err = Error::MissingRequiredBlock(format!("{} produced no blocks", generator.name()));
            log::error!("Generator '{}' defect: {}", generator.name(), err);
            return Err(err);
        }

        log::debug!(
            "Rendered {} to {} ({} blocks)",
            doc_type,
            code,
            blocks.len()
        );

        Ok(RenderedDocument {
            doc_type,
            format: code,
            language,
            profile: profile.clone(),
            blocks,
        })
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
