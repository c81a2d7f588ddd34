//! Integration tests for batch processing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use housestyle::batch::{process_with_progress, Outcome};
use housestyle::error::Result;
use housestyle::generate::{Generator, GeneratorRegistry, RenderContext};
use housestyle::model::Block;
use housestyle::writer::WriteJob;
use housestyle::{
    load_file, process, BatchItem, BatchOptions, BatchReport, CacheStatus, CancellationToken,
    DocType, Engine, Error, ErrorKind, FormatCode, JsonIrWriter, Stage, ValidatedRecord,
    WriterPool,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// CV-MC2I generator that misbehaves on purpose.
enum Faulty {
    Slow(Duration),
    Panics,
    Fails,
}

impl Generator for Faulty {
    fn name(&self) -> &str {
        "faulty"
    }

    fn doc_type(&self) -> DocType {
        DocType::Mc2iCv
    }

    fn render(&self, _record: &ValidatedRecord, _ctx: &RenderContext<'_>) -> Result<Vec<Block>> {
        match self {
            Faulty::Slow(delay) => {
                std::thread::sleep(*delay);
                Ok(Vec::new())
            }
            Faulty::Panics => panic!("generator bug"),
            Faulty::Fails => Err(Error::Render("span outside text".into())),
        }
    }
}

fn engine_with(faulty: Faulty) -> Engine {
    let mut registry = GeneratorRegistry::with_defaults();
    registry
        .register(FormatCode::CvMc2i, Arc::new(faulty))
        .unwrap();
    Engine::new().with_registry(registry)
}

/// Runs the fixtures through `engine` and checks the CV-MC2I pair failed
/// alone with `kind`.
fn assert_only_mc2i_fails(engine: &Engine, options: &BatchOptions, kind: ErrorKind) -> BatchReport {
    let report = process(engine, &fixture_items(), &[], options);

    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(report.outcomes[0].is_success());
    assert!(report.outcomes[1].is_success());

    let failed = &report.outcomes[2];
    assert_eq!(failed.format, Some(FormatCode::CvMc2i));
    assert_eq!(failed.error().unwrap().kind, kind);
    assert_eq!(report.exit_code(true), 0);
    report
}

fn fixture_items() -> Vec<BatchItem> {
    ["posting_fr.yaml", "cv_akazi.json", "cv_mc2i.yaml"]
        .iter()
        .map(|name| BatchItem::load(fixture(name)))
        .collect()
}

#[test]
fn test_all_compatible_formats() {
    let engine = Engine::new();
    let report = process(&engine, &fixture_items(), &[], &BatchOptions::default());

    let stems: Vec<String> = report.outcomes.iter().map(|o| o.artifact_stem()).collect();
    assert_eq!(
        stems,
        vec![
            "posting_fr.JD-AKAZI-FR",
            "cv_akazi.CV-AKAZI",
            "cv_mc2i.CV-MC2I"
        ]
    );
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.exit_code(true), 0);
}

#[test]
fn test_explicit_formats_are_item_major() {
    let engine = Engine::new();
    let items = fixture_items();
    let formats = [FormatCode::CvAkazi, FormatCode::CvMc2i];
    let report = process(&engine, &items, &formats, &BatchOptions::default());

    assert_eq!(report.total(), 6);
    let order: Vec<(usize, Option<FormatCode>)> =
        report.outcomes.iter().map(|o| (o.index, o.format)).collect();
    assert_eq!(
        order,
        vec![
            (0, Some(FormatCode::CvAkazi)),
            (0, Some(FormatCode::CvMc2i)),
            (1, Some(FormatCode::CvAkazi)),
            (1, Some(FormatCode::CvMc2i)),
            (2, Some(FormatCode::CvAkazi)),
            (2, Some(FormatCode::CvMc2i)),
        ]
    );

    // Wrong-type pairs fail in isolation, after validation.
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 4);
    assert!(report.failures().all(|o| o.error().unwrap().stage == Stage::Resolution));
    assert_eq!(report.exit_code(true), 0);
}

#[test]
fn test_sequential_matches_parallel() {
    let engine = Engine::new();
    let items = fixture_items();

    let parallel = process(&engine, &items, &[], &BatchOptions::new().with_workers(3));
    let sequential = process(&Engine::new(), &items, &[], &BatchOptions::new().sequential());

    assert_eq!(parallel.total(), sequential.total());
    for (a, b) in parallel.outcomes.iter().zip(&sequential.outcomes) {
        assert_eq!(a.artifact_stem(), b.artifact_stem());
        assert_eq!(a.document(), b.document());
    }
}

#[test]
fn test_duplicates_hit_the_cache() {
    let engine = Engine::new();
    let raw = load_file(fixture("cv_akazi.json")).unwrap();
    let items: Vec<BatchItem> = (0..8)
        .map(|i| BatchItem::new(format!("copy{}", i), raw.clone()))
        .collect();

    let report = process(&engine, &items, &[FormatCode::CvAkazi], &BatchOptions::default());
    assert_eq!(report.succeeded, 8);
    assert_eq!(report.cache_hits, 7);
    assert_eq!(engine.cache().len(), 1);

    let misses = report
        .outcomes
        .iter()
        .filter(|o| matches!(o.outcome, Outcome::Success { cache: CacheStatus::Miss, .. }))
        .count();
    assert_eq!(misses, 1);
}

#[test]
fn test_invalid_record_is_isolated() {
    let engine = Engine::new();
    let mut broken = load_file(fixture("cv_akazi.json")).unwrap();
    broken["experiences"] = json!([]);

    let items = vec![
        BatchItem::load(fixture("cv_akazi.json")),
        BatchItem::new("broken", broken),
        BatchItem::new("unknown", json!({"foo": 1})),
    ];
    let report = process(&engine, &items, &[], &BatchOptions::default());

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);

    let broken = &report.outcomes[1];
    let error = broken.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Validation);
    assert_eq!(error.stage, Stage::Validation);
    assert!(error.violations.iter().any(|v| v.path == "experiences"));

    let unknown = &report.outcomes[2];
    assert_eq!(unknown.format, None);
    assert_eq!(unknown.error().unwrap().kind, ErrorKind::UnrecognizedSchema);

    assert_eq!(report.exit_code(false), 0);
    assert_eq!(report.exit_code(true), 1);
}

#[test]
fn test_progress_called_per_pair() {
    let engine = Engine::new();
    let calls = AtomicUsize::new(0);
    let report = process_with_progress(
        &engine,
        &fixture_items(),
        &[],
        &BatchOptions::default(),
        |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        },
    );
    assert_eq!(calls.load(Ordering::SeqCst), report.total());
}

#[test]
fn test_cancelled_batch() {
    let token = CancellationToken::new();
    token.cancel();
    let options = BatchOptions::new().with_cancellation(token);

    let report = process(&Engine::new(), &fixture_items(), &[], &options);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.cancelled, report.total());
    assert!(report
        .failures()
        .all(|o| o.error().unwrap().kind == ErrorKind::Cancelled));
}

#[test]
fn test_generous_timeout() {
    let options = BatchOptions::new().with_timeout(Duration::from_secs(30));
    let report = process(&Engine::new(), &fixture_items(), &[], &options);
    assert_eq!(report.succeeded, 3);
}

#[test]
fn test_timeout_fires_per_pair() {
    let engine = engine_with(Faulty::Slow(Duration::from_millis(300)));
    let options = BatchOptions::new().with_timeout(Duration::from_millis(50));
    let report = assert_only_mc2i_fails(&engine, &options, ErrorKind::Timeout);

    assert_eq!(report.outcomes[2].error().unwrap().stage, Stage::Scheduling);
    assert!(report.outcomes[2].elapsed_ms < 300);
}

#[test]
fn test_panicking_generator_is_isolated() {
    let engine = engine_with(Faulty::Panics);
    assert_only_mc2i_fails(&engine, &BatchOptions::default(), ErrorKind::Render);
    assert_only_mc2i_fails(&engine, &BatchOptions::new().sequential(), ErrorKind::Render);
    assert_only_mc2i_fails(
        &engine,
        &BatchOptions::new().with_timeout(Duration::from_secs(30)),
        ErrorKind::Render,
    );
}

#[test]
fn test_generator_error_is_isolated() {
    let engine = engine_with(Faulty::Fails);
    let report = assert_only_mc2i_fails(&engine, &BatchOptions::default(), ErrorKind::Render);

    assert_eq!(report.outcomes[2].error().unwrap().stage, Stage::Render);
    assert_eq!(engine.cache().len(), 2);
}

#[test]
fn test_report_json_shape() {
    let items = vec![
        BatchItem::load(fixture("cv_mc2i.yaml")),
        BatchItem::load(fixture("missing.yaml")),
    ];
    let report = process(&Engine::new(), &items, &[], &BatchOptions::default());
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["items"], 2);
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["outcomes"][0]["item"], "cv_mc2i");
    assert_eq!(json["outcomes"][0]["format"], "CV-MC2I");
    assert_eq!(json["outcomes"][0]["status"], "success");
    assert_eq!(json["outcomes"][1]["status"], "failure");
    assert_eq!(json["outcomes"][1]["error"]["kind"], "io");
    assert_eq!(json["outcomes"][1]["error"]["stage"], "input");
}

#[test]
fn test_same_stem_inputs_get_distinct_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for sub in ["a", "b"] {
        let path = dir.path().join(sub).join("cv.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::copy(fixture("cv_akazi.json"), &path).unwrap();
        paths.push(path);
    }
    let yaml = dir.path().join("a").join("cv.yaml");
    std::fs::copy(fixture("cv_mc2i.yaml"), &yaml).unwrap();
    paths.push(yaml);

    let items: Vec<BatchItem> = paths.iter().map(BatchItem::load).collect();
    let report = process(&Engine::new(), &items, &[], &BatchOptions::default());
    assert_eq!(report.succeeded, 3);

    let stems: Vec<String> = report.outcomes.iter().map(|o| o.artifact_stem()).collect();
    assert_eq!(stems, ["cv.CV-AKAZI", "cv-1.CV-AKAZI", "cv-2.CV-MC2I"]);
    assert!(report.outcomes.iter().all(|o| o.item == "cv"));

    let jobs: Vec<WriteJob> = report
        .outcomes
        .iter()
        .map(|o| WriteJob::new(o.artifact_stem(), o.document().unwrap().clone()))
        .collect();
    let out = dir.path().join("out");
    let written = WriterPool::new(Arc::new(JsonIrWriter::new()), &out)
        .write_all(jobs)
        .unwrap();
    assert!(written.iter().all(|w| w.result.is_ok()));
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 3);
}
