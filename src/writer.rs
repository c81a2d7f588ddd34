//! Document writers and the pooled, retrying write stage.
//!
//! Writers only serialize; all layout decisions are already in the IR. Writes
//! are the one stage allowed to retry, with bounded exponential backoff.

use crate::error::{Error, Result};
use crate::model::RenderedDocument;
use crate::render::{to_json, to_text, JsonFormat};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Trait for document writers.
///
/// Implement this trait to serialize the IR to a new file format.
pub trait DocumentWriter: Send + Sync {
    /// Get the name of this writer.
    fn name(&self) -> &str;

    /// File extension of written artifacts, without the leading dot.
    fn extension(&self) -> &str;

    /// Serialize a document to bytes.
    fn serialize(&self, doc: &RenderedDocument) -> Result<Vec<u8>>;

    /// Write a document to a path.
    fn write(&self, doc: &RenderedDocument, path: &Path) -> Result<()> {
        let bytes = self.serialize(doc)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Writes the IR and its profile snapshot as JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonIrWriter {
    format: JsonFormat,
}

impl JsonIrWriter {
    /// Create a pretty-printing JSON writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON layout.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }
}

impl DocumentWriter for JsonIrWriter {
    fn name(&self) -> &str {
        "json"
    }

    fn extension(&self) -> &str {
        "json"
    }

    fn serialize(&self, doc: &RenderedDocument) -> Result<Vec<u8>> {
        Ok(to_json(doc, self.format)?.into_bytes())
    }
}

/// Writes a plain text preview.
#[derive(Debug, Clone, Default)]
pub struct TextPreviewWriter {
    mark_inferred: bool,
}

impl TextPreviewWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap deduced runs in `[~ ~]`.
    pub fn with_inferred_markers(mut self, mark: bool) -> Self {
        self.mark_inferred = mark;
        self
    }
}

impl DocumentWriter for TextPreviewWriter {
    fn name(&self) -> &str {
        "text"
    }

    fn extension(&self) -> &str {
        "txt"
    }

    fn serialize(&self, doc: &RenderedDocument) -> Result<Vec<u8>> {
        let mut text = to_text(doc, self.mark_inferred);
        text.push('\n');
        Ok(text.into_bytes())
    }
}

/// Bounded exponential backoff for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any delay
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Create a retry policy with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set the total number of attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the initial and maximum backoff.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }

    /// Delay after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. Returns the result and the number of attempts made.
    pub fn run<T, F>(&self, mut op: F) -> (Result<T>, u32)
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return (Ok(value), attempt),
                Err(err) if attempt < self.max_attempts && is_retryable(&err) => {
                    let delay = self.backoff(attempt);
                    log::debug!("Attempt {} failed ({}), retrying in {:?}", attempt, err, delay);
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return (Err(err), attempt),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(2),
        }
    }
}

fn is_retryable(err: &Error) -> bool {
    matches!(err, Error::Io(_) | Error::Write(_))
}

/// A document queued for writing.
#[derive(Debug, Clone)]
pub struct WriteJob {
    /// Artifact file stem
    pub stem: String,
    /// Document to write
    pub document: Arc<RenderedDocument>,
}

impl WriteJob {
    pub fn new(stem: impl Into<String>, document: Arc<RenderedDocument>) -> Self {
        Self {
            stem: stem.into(),
            document,
        }
    }
}

/// Result of one write job.
#[derive(Debug)]
pub struct WriteOutcome {
    /// Artifact file stem
    pub stem: String,
    /// Attempts made
    pub attempts: u32,
    /// Written path, or the last error
    pub result: Result<PathBuf>,
}

/// Fans write jobs out over worker threads.
pub struct WriterPool {
    writer: Arc<dyn DocumentWriter>,
    output_dir: PathBuf,
    workers: usize,
    retry: RetryPolicy,
}

impl WriterPool {
    /// Create a pool writing into `output_dir`.
    pub fn new(writer: Arc<dyn DocumentWriter>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            writer,
            output_dir: output_dir.into(),
            workers: 4,
            retry: RetryPolicy::default(),
        }
    }

    /// Set the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Target path for an artifact stem.
    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", stem, self.writer.extension()))
    }

    /// Write every job; outcomes come back in job order.
    pub fn write_all(&self, jobs: Vec<WriteJob>) -> Result<Vec<WriteOutcome>> {
        fs::create_dir_all(&self.output_dir)?;
        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, WriteJob)>();
        let (out_tx, out_rx) = crossbeam_channel::unbounded::<(usize, WriteOutcome)>();
        for (index, job) in jobs.into_iter().enumerate() {
            // Receiver is alive until the scope below ends.
            let _ = job_tx.send((index, job));
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..self.workers.min(total) {
                let job_rx = job_rx.clone();
                let out_tx = out_tx.clone();
                scope.spawn(move || {
                    for (index, job) in job_rx.iter() {
                        let _ = out_tx.send((index, self.write_one(job)));
                    }
                });
            }
        });
        drop(out_tx);

        let mut slots: Vec<Option<WriteOutcome>> = (0..total).map(|_| None).collect();
        for (index, outcome) in out_rx.iter() {
            slots[index] = Some(outcome);
        }
        Ok(slots.into_iter().flatten().collect())
    }

    fn write_one(&self, job: WriteJob) -> WriteOutcome {
        let path = self.path_for(&job.stem);
        let (result, attempts) = self.retry.run(|| self.writer.write(&job.document, &path));
        if let Err(e) = &result {
            log::warn!("Writing {} failed after {} attempts: {}", path.display(), attempts, e);
        }
        WriteOutcome {
            stem: job.stem,
            attempts,
            result: result.map(|()| path),
        }
    }
}
