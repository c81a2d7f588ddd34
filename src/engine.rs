//! Pipeline facade: detect, validate, resolve, render, with caching.

use crate::cache::{CacheKey, CacheStatus, RenderCache};
use crate::detect::{detect, DocType};
use crate::error::{Error, Result};
use crate::generate::GeneratorRegistry;
use crate::model::RenderedDocument;
use crate::profile::FormatCode;
use crate::render::RenderOptions;
use crate::validate::{validate, ValidatedRecord};
use serde_json::Value;
use std::sync::Arc;

/// Rendering engine shared by single renders and batches.
///
/// The registry and cache sit behind `Arc`s so an engine is cheap to clone
/// into worker threads.
///
/// # Example
///
/// ```
/// use housestyle::{Engine, FormatCode};
/// use serde_json::json;
///
/// let engine = Engine::new();
/// let raw = json!({"mission_title": "Data Lead"});
/// assert!(engine.render(&raw, FormatCode::JdAkaziFr).is_err());
/// ```
#[derive(Clone)]
pub struct Engine {
    registry: Arc<GeneratorRegistry>,
    cache: Arc<RenderCache>,
    options: RenderOptions,
}

impl Engine {
    /// Create an engine with the built-in formats and an empty cache.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(GeneratorRegistry::with_defaults()),
            cache: Arc::new(RenderCache::new()),
            options: RenderOptions::default(),
        }
    }

    /// Use a custom registry.
    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Share an existing cache.
    pub fn with_cache(mut self, cache: Arc<RenderCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Set render options.
    ///
    /// Options are part of every cache key, so a shared cache can serve
    /// engines with different options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// The generator registry.
    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// The render cache.
    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Render options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Detect and validate a raw record.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedRecord> {
        let doc_type = detect(raw)?;
        validate(raw, doc_type)
    }

    /// Full pipeline without the cache.
    pub fn render(&self, raw: &Value, format: FormatCode) -> Result<RenderedDocument> {
        let record = self.validate(raw)?;
        self.registry.render(&record, format, &self.options)
    }

    /// Cache key for a raw record rendered to a format.
    pub fn cache_key(&self, raw: &Value, doc_type: DocType, format: FormatCode) -> Result<CacheKey> {
        let profile = self
            .registry
            .profile(format)
            .ok_or_else(|| Error::UnsupportedFormat {
                doc_type,
                format: format.to_string(),
                reason: "no generator registered".into(),
            })?;
        Ok(CacheKey::new(
            raw,
            doc_type,
            format,
            &profile.version,
            &self.options,
        ))
    }

    /// Full pipeline through the cache.
    ///
    /// Detection always runs; validation and rendering only run on a miss.
    pub fn render_cached(
        &self,
        raw: &Value,
        format: FormatCode,
    ) -> Result<(Arc<RenderedDocument>, CacheStatus)> {
        let doc_type = detect(raw)?;
        let key = self.cache_key(raw, doc_type, format)?;
        self.cache.get_or_render(&key, || {
            let record = validate(raw, doc_type)?;
            self.registry.render(&record, format, &self.options)
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::fixtures;

    #[test]
    fn test_render_cached_hits() {
        let engine = Engine::new();
        let raw = fixtures::akazi_cv();
        let (first, status) = engine.render_cached(&raw, FormatCode::CvAkazi).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        let (second, status) = engine.render_cached(&raw, FormatCode::CvAkazi).unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(first, second);
        assert_eq!(*first, engine.render(&raw, FormatCode::CvAkazi).unwrap());
    }

    #[test]
    fn test_options_keep_shared_cache() {
        let shared = Arc::new(RenderCache::new());
        let raw = fixtures::akazi_cv();
        let plain = Engine::new().with_cache(shared.clone());
        plain.render_cached(&raw, FormatCode::CvAkazi).unwrap();

        let custom = Engine::new()
            .with_cache(shared.clone())
            .with_options(RenderOptions::new().with_placeholder("N/A"));
        assert_eq!(custom.cache().len(), 1);
        let (doc, status) = custom.render_cached(&raw, FormatCode::CvAkazi).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert!(doc.plain_text().contains("TJM souhaité : N/A"));
        assert_eq!(shared.len(), 2);

        let (_, status) = plain.render_cached(&raw, FormatCode::CvAkazi).unwrap();
        assert_eq!(status, CacheStatus::Hit);
    }

    #[test]
    fn test_unknown_record() {
        let engine = Engine::new();
        let result = engine.render_cached(&serde_json::json!({"foo": 1}), FormatCode::CvMc2i);
        assert!(matches!(result, Err(Error::UnrecognizedSchema { .. })));
    }
}
