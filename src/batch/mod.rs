//! Batch rendering of many records to many formats.
//!
//! Each (record, format) pair is an isolated unit: its failure is recorded
//! as a [`Outcome::Failure`] and never affects other pairs. Pairs run on a
//! rayon pool and are collected in input order, whatever order they finish
//! in.
//!
//! # Example
//!
//! ```no_run
//! use housestyle::batch::{process, BatchItem, BatchOptions};
//! use housestyle::{Engine, FormatCode};
//!
//! let items = vec![BatchItem::load("cv.yaml")];
//! let report = process(&Engine::new(), &items, &[FormatCode::CvAkazi], &BatchOptions::default());
//! println!("{} succeeded, {} failed", report.succeeded, report.failed);
//! std::process::exit(report.exit_code(true));
//! ```

mod report;

pub use report::{BatchReport, ErrorDetail, Outcome, PairOutcome};

use crate::cache::CacheStatus;
use crate::detect::{detect, DocType};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::load::load_file;
use crate::model::{Language, RenderedDocument};
use crate::profile::FormatCode;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One input record of a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Display name, used in the report and for artifact names
    pub name: String,
    record: std::result::Result<Arc<Value>, ErrorDetail>,
}

impl BatchItem {
    /// Item from an in-memory record.
    pub fn new(name: impl Into<String>, record: Value) -> Self {
        Self {
            name: name.into(),
            record: Ok(Arc::new(record)),
        }
    }

    /// Item loaded from a file.
    ///
    /// Load errors are kept on the item and reported as input failures.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("record")
            .to_string();
        let record = load_file(path)
            .map(Arc::new)
            .map_err(|e| ErrorDetail::from(&e));
        Self { name, record }
    }

    /// Raw record, when it loaded.
    pub fn record(&self) -> Option<&Value> {
        self.record.as_deref().ok()
    }
}

/// Cooperative cancellation flag shared between a batch and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; pairs not yet started are skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for batch runs.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Run pairs in parallel
    pub parallel: bool,

    /// Worker threads (`None` = rayon default)
    pub workers: Option<usize>,

    /// Strict mode: pre-render failures make the exit code non-zero
    pub strict: bool,

    /// Time budget per pair
    pub timeout: Option<Duration>,

    /// Cancellation token
    pub cancel: CancellationToken,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Enable strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the per-pair time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            workers: None,
            strict: false,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// One unit of work after expansion.
struct Pair<'a> {
    index: usize,
    item: &'a BatchItem,
    artifact: &'a str,
    doc_type: Option<DocType>,
    format: Option<FormatCode>,
    error: Option<ErrorDetail>,
}

/// Formats targeted by a record when the caller names none.
fn compatible_formats(engine: &Engine, raw: &Value, doc_type: DocType) -> Vec<FormatCode> {
    let language = raw
        .pointer("/document_metadata/language_iso")
        .and_then(Value::as_str)
        .and_then(|code| code.parse::<Language>().ok());
    engine
        .registry()
        .formats()
        .into_iter()
        .filter(|code| code.doc_type() == doc_type)
        .filter(|code| match (code.fixed_language(), language) {
            (Some(fixed), Some(lang)) => fixed == lang,
            _ => true,
        })
        .collect()
}

/// Artifact base names, one per item.
///
/// Items sharing a name (`a/cv.json` and `b/cv.json`, or `cv.json` and
/// `cv.yaml`) keep it for the first occurrence; later ones get their index
/// appended so no two items write to the same path.
fn artifact_names(items: &[BatchItem]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(items.len());
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut name = item.name.clone();
            let mut suffix = index;
            while !taken.insert(name.clone()) {
                name = format!("{}-{}", item.name, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

fn expand<'a>(
    engine: &Engine,
    items: &'a [BatchItem],
    artifacts: &'a [String],
    formats: &[FormatCode],
) -> Vec<Pair<'a>> {
    let mut pairs = Vec::new();
    for ((index, item), artifact) in items.iter().enumerate().zip(artifacts) {
        let artifact = artifact.as_str();
        let failed = |error: ErrorDetail, format: Option<FormatCode>| Pair {
            index,
            item,
            artifact,
            doc_type: None,
            format,
            error: Some(error),
        };

        let raw = match &item.record {
            Ok(raw) => raw,
            Err(error) => {
                if formats.is_empty() {
                    pairs.push(failed(error.clone(), None));
                } else {
                    pairs.extend(formats.iter().map(|f| failed(error.clone(), Some(*f))));
                }
                continue;
            }
        };

        let doc_type = match detect(raw) {
            Ok(doc_type) => doc_type,
            Err(e) => {
                let error = ErrorDetail::from(&e);
                if formats.is_empty() {
                    pairs.push(failed(error, None));
                } else {
                    pairs.extend(formats.iter().map(|f| failed(error.clone(), Some(*f))));
                }
                continue;
            }
        };

        let targets = if formats.is_empty() {
            compatible_formats(engine, raw, doc_type)
        } else {
            formats.to_vec()
        };
        pairs.extend(targets.into_iter().map(|format| Pair {
            index,
            item,
            artifact,
            doc_type: Some(doc_type),
            format: Some(format),
            error: None,
        }));
    }
    pairs
}

fn render_guarded(engine: &Engine, raw: &Value, format: FormatCode) -> Result<(Arc<RenderedDocument>, CacheStatus)> {
    catch_unwind(AssertUnwindSafe(|| engine.render_cached(raw, format)))
        .unwrap_or_else(|_| Err(Error::Render(format!("generator for {} panicked", format))))
}

fn render_with_timeout(
    engine: &Engine,
    raw: &Arc<Value>,
    format: FormatCode,
    timeout: Duration,
) -> Result<(Arc<RenderedDocument>, CacheStatus)> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let engine = engine.clone();
    let raw = Arc::clone(raw);
    std::thread::Builder::new()
        .name(format!("render-{}", format))
        .spawn(move || {
            // The receiver is gone when the pair already timed out.
            let _ = tx.send(render_guarded(&engine, &raw, format));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(crossbeam_channel::RecvTimeoutError::Timeout) => Err(Error::Timeout(timeout)),
        Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
            Err(Error::Render(format!("render worker for {} exited", format)))
        }
    }
}

fn run_pair(engine: &Engine, pair: &Pair<'_>, options: &BatchOptions) -> PairOutcome {
    let started = Instant::now();
    let finish = |outcome: Outcome| PairOutcome {
        index: pair.index,
        item: pair.item.name.clone(),
        artifact: pair.artifact.to_string(),
        format: pair.format,
        doc_type: pair.doc_type,
        outcome,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    let fail = |err: &Error| {
        log::warn!(
            "{} [{}]: {}",
            pair.item.name,
            pair.format.map(|f| f.as_str()).unwrap_or("-"),
            err
        );
        finish(Outcome::Failure {
            error: ErrorDetail::from(err),
        })
    };

    if options.cancel.is_cancelled() {
        return fail(&Error::Cancelled);
    }
    if let Some(error) = &pair.error {
        log::warn!("{}: {}", pair.item.name, error.message);
        return finish(Outcome::Failure {
            error: error.clone(),
        });
    }

    let (Ok(raw), Some(format)) = (&pair.item.record, pair.format) else {
        return fail(&Error::Other("pair has no record or format".into()));
    };

    let result = match options.timeout {
        Some(timeout) => render_with_timeout(engine, raw, format, timeout),
        None => render_guarded(engine, raw, format),
    };

    match result {
        Ok((document, cache)) => finish(Outcome::Success {
            cache,
            blocks: document.block_count(),
            document,
        }),
        Err(err) => fail(&err),
    }
}

/// Render every item to every target format.
///
/// With an empty `formats` slice each record targets every registered format
/// compatible with its detected type and language.
pub fn process(
    engine: &Engine,
    items: &[BatchItem],
    formats: &[FormatCode],
    options: &BatchOptions,
) -> BatchReport {
    process_with_progress(engine, items, formats, options, |_| {})
}

/// Like [`process`], calling `progress` as each pair completes.
pub fn process_with_progress<F>(
    engine: &Engine,
    items: &[BatchItem],
    formats: &[FormatCode],
    options: &BatchOptions,
    progress: F,
) -> BatchReport
where
    F: Fn(&PairOutcome) + Sync,
{
    let started = Instant::now();
    let artifacts = artifact_names(items);
    let pairs = expand(engine, items, &artifacts, formats);
    log::info!(
        "Batch: {} items, {} pairs ({})",
        items.len(),
        pairs.len(),
        if options.parallel { "parallel" } else { "sequential" }
    );

    let run = |pair: &Pair<'_>| {
        let outcome = run_pair(engine, pair, options);
        progress(&outcome);
        outcome
    };

    let outcomes: Vec<PairOutcome> = if !options.parallel {
        pairs.iter().map(run).collect()
    } else {
        let pool = options.workers.and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| log::warn!("Falling back to the global pool: {}", e))
                .ok()
        });
        match pool {
            Some(pool) => pool.install(|| pairs.par_iter().map(run).collect()),
            None => pairs.par_iter().map(run).collect(),
        }
    };

    let report = BatchReport::new(items.len(), outcomes, started.elapsed().as_millis() as u64);
    log::info!(
        "Batch done: {} succeeded, {} failed, {} cache hits",
        report.succeeded,
        report.failed,
        report.cache_hits
    );
    report
}
