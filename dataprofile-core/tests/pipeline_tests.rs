//! End-to-end pipeline scenarios: upload, preview, generate, persist

use dataprofile_core::frame::rows_text;
use dataprofile_core::{
    DataFrame, DescriptiveProfiler, LogBuffer, PipelineOutcome, PipelineState, ProfileReport,
    Profiler, ReportArtifact, ReportOrchestrator, ReportSettings, UploadedFile,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

struct FailingProfiler;

impl Profiler for FailingProfiler {
    fn name(&self) -> &str {
        "failing"
    }

    fn profile(
        &self,
        _df: &DataFrame,
        _settings: &ReportSettings,
        console: &mut dyn Write,
    ) -> anyhow::Result<ProfileReport> {
        writeln!(console, "Summarize dataset: 0/1")?;
        anyhow::bail!("memory limit exceeded")
    }
}

fn orchestrator(dir: &TempDir, profiler: Arc<dyn Profiler>) -> ReportOrchestrator {
    ReportOrchestrator::new(profiler, ReportSettings::default()).with_output_dir(dir.path())
}

fn files_in(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_csv_upload_produces_named_artifact() {
    let dir = TempDir::new().unwrap();
    let upload = UploadedFile::new("data.csv", "a,b\n1,2\n3,4\n");

    let outcome = orchestrator(&dir, Arc::new(DescriptiveProfiler::new())).process(&upload);

    let preview = outcome.table().unwrap().head(Some(5));
    assert_eq!(preview.height(), 2);
    assert_eq!(preview.width(), 2);
    assert_eq!(rows_text(&preview).unwrap()[1], vec!["3", "4"]);

    let generation = outcome.generation().unwrap();
    let artifact = generation.artifact().unwrap();
    assert_eq!(artifact.file_name, "data_report.html");
    assert_eq!(artifact.mime(), ReportArtifact::MIME);
    assert_eq!(ReportArtifact::MIME, "text/html");
    assert!(artifact.html.starts_with("<!DOCTYPE html>"));

    let written = std::fs::read_to_string(dir.path().join("data_report.html")).unwrap();
    assert_eq!(written, artifact.html);
    assert!(generation.log.contains("Summarize dataset"));
}

#[test]
fn test_json_upload_is_profiled() {
    let dir = TempDir::new().unwrap();
    let upload = UploadedFile::new(
        "people.json",
        r#"[{"name": "Ann", "age": 31}, {"name": "Bob", "age": null}]"#,
    );

    let outcome = orchestrator(&dir, Arc::new(DescriptiveProfiler::new())).process(&upload);

    let artifact = outcome.generation().unwrap().artifact().unwrap();
    assert_eq!(artifact.file_name, "people_report.html");
    assert!(artifact.html.contains("age"));
    assert_eq!(files_in(&dir), vec!["people_report.html"]);
}

#[test]
fn test_repeated_csv_headers_are_profiled_separately() {
    let dir = TempDir::new().unwrap();
    let upload = UploadedFile::new("d.csv", "a,a\n1,2\n3,4\n");

    let outcome = orchestrator(&dir, Arc::new(DescriptiveProfiler::new())).process(&upload);

    let table = outcome.table().unwrap();
    assert_eq!(table.width(), 2);
    let artifact = outcome.generation().unwrap().artifact().unwrap();
    let report: serde_json::Value = serde_json::from_str(&artifact.json).unwrap();
    let names: Vec<&str> = report["variables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "a.1"]);
}

#[test]
fn test_unsupported_upload_stops_before_profiling() {
    let dir = TempDir::new().unwrap();
    let upload = UploadedFile::new("notes.txt", "just some notes");

    let outcome = orchestrator(&dir, Arc::new(DescriptiveProfiler::new())).process(&upload);

    match &outcome {
        PipelineOutcome::Rejected { error, run } => {
            assert_eq!(error.user_message(), "Unsupported file format");
            assert!(!run.transitions().contains(&PipelineState::Profiling));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(files_in(&dir).is_empty());
}

#[test]
fn test_profiling_failure_writes_nothing_but_keeps_log() {
    let dir = TempDir::new().unwrap();
    let upload = UploadedFile::new("data.csv", "a,b\n1,2\n");

    let outcome = orchestrator(&dir, Arc::new(FailingProfiler)).process(&upload);

    let generation = outcome.generation().unwrap();
    let message = generation.error().unwrap().user_message();
    assert_eq!(message, "An error occurred during profiling: memory limit exceeded");
    assert!(generation.log.contains("Summarize dataset: 0/1"));
    assert!(files_in(&dir).is_empty());
}

#[test]
fn test_repeated_generation_reuses_file_name() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator(&dir, Arc::new(DescriptiveProfiler::new()));
    let table = dataprofile_core::data_source::load_csv(b"x,y\n1,a\n2,b\n").unwrap();

    let first = orchestrator.generate(&table, "sales");
    let second = orchestrator.generate(&table, "sales");

    let first = first.artifact().unwrap();
    let second = second.artifact().unwrap();
    assert_eq!(first.file_name, "sales_report.html");
    assert_eq!(first.file_name, second.file_name);
    assert_eq!(first.path, second.path);
    assert_eq!(files_in(&dir), vec!["sales_report.html"]);
}

#[test]
fn test_outer_logging_restored_after_success_and_failure() {
    let outer = LogBuffer::new();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(outer.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let dir = TempDir::new().unwrap();
        let upload = UploadedFile::new("data.csv", "a\n1\n2\n");

        let ok = orchestrator(&dir, Arc::new(DescriptiveProfiler::new())).process(&upload);
        tracing::info!("marker after success");
        let failed = orchestrator(&dir, Arc::new(FailingProfiler)).process(&upload);
        tracing::info!("marker after failure");

        let text = outer.contents();
        assert!(text.contains("marker after success"));
        assert!(text.contains("marker after failure"));
        assert!(!text.contains("Summarize dataset"));
        assert!(!ok.generation().unwrap().log.contains("marker"));
        assert!(!failed.generation().unwrap().log.contains("marker"));
    });
}

#[test]
fn test_report_without_output_dir_stays_in_memory() {
    let orchestrator =
        ReportOrchestrator::new(Arc::new(DescriptiveProfiler::new()), ReportSettings::default());
    let upload = UploadedFile::new("data.csv", "a\n1\n");

    let outcome = orchestrator.process(&upload);

    let artifact = outcome.generation().unwrap().artifact().unwrap();
    assert!(artifact.path.is_none());
    assert!(artifact.size() > 0);
}
