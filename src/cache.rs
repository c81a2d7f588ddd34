//! Content-addressed memoization of renders.
//!
//! Keys hash the raw record content together with the document type, the
//! target format, the profile version, the record's declared
//! `format_version` and the render options. A hit returns the stored
//! document without running the render closure, so the record is neither
//! re-validated nor re-rendered.

use crate::detect::DocType;
use crate::error::Result;
use crate::model::RenderedDocument;
use crate::profile::FormatCode;
use crate::render::RenderOptions;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

const KEY_DOMAIN: &[u8] = b"housestyle-render-v1";

/// Stable SHA-256 key for one (record, format) render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Compute the key for a raw record rendered to a format.
    ///
    /// Object keys are hashed in sorted order, so two records differing only
    /// in key order share a key.
    pub fn new(
        raw: &Value,
        doc_type: DocType,
        format: FormatCode,
        profile_version: &str,
        options: &RenderOptions,
    ) -> Self {
        let format_version = raw
            .pointer("/document_metadata/format_version")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(KEY_DOMAIN);
        for part in [
            doc_type.as_str(),
            format.as_str(),
            profile_version,
            format_version,
            options.placeholder.as_str(),
        ] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        hasher.update([u8::from(options.uppercase_headings)]);
        hash_value(&mut hasher, raw);
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update([0u8]),
        Value::Bool(b) => hasher.update([1u8, u8::from(*b)]),
        Value::Number(n) => {
            hasher.update([2u8]);
            hash_str(hasher, &n.to_string());
        }
        Value::String(s) => {
            hasher.update([3u8]);
            hash_str(hasher, s);
        }
        Value::Array(items) => {
            hasher.update([4u8]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                hash_value(hasher, item);
            }
        }
        Value::Object(map) => {
            hasher.update([5u8]);
            hasher.update((map.len() as u64).to_le_bytes());
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                hash_str(hasher, key);
                hash_value(hasher, &map[key.as_str()]);
            }
        }
    }
}

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Counters snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

type Slot = Arc<Mutex<Option<Arc<RenderedDocument>>>>;

/// Thread-safe render cache.
///
/// Each key owns its own slot, so concurrent renders of different keys run in
/// parallel while concurrent requests for the same key render it once.
/// Failed renders are not stored, and their slot is dropped.
///
/// Lock order is slot then map; the map lock is never held while waiting on
/// a slot.
#[derive(Debug, Default)]
pub struct RenderCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl RenderCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.clone()).or_default().clone()
    }

    /// Return the cached document for `key`, or run `render` once and store
    /// its result.
    pub fn get_or_render<F>(
        &self,
        key: &CacheKey,
        render: F,
    ) -> Result<(Arc<RenderedDocument>, CacheStatus)>
    where
        F: FnOnce() -> Result<RenderedDocument>,
    {
        let slot = self.slot(key);
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(doc) = entry.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("Cache hit {}", &key.as_str()[..12]);
            return Ok((doc.clone(), CacheStatus::Hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("Cache miss {}", &key.as_str()[..12]);
        let doc = match render() {
            Ok(doc) => Arc::new(doc),
            Err(err) => {
                self.evict(key, &slot);
                return Err(err);
            }
        };
        *entry = Some(doc.clone());
        Ok((doc, CacheStatus::Miss))
    }

    /// Remove `slot` from the map if it is still the one stored for `key`.
    fn evict(&self, key: &CacheKey, slot: &Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(key);
        }
    }

    /// Cached document for a key, if any.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<RenderedDocument>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.get(key)?.clone();
        drop(slots);
        let entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        entry.clone()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        slots
            .iter()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    /// Check if the cache holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset counters.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Counters snapshot.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
