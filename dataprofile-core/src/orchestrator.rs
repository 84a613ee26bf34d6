//! Load, profile, render: one pipeline run per uploaded file

use crate::data_source::{self, UploadedFile, REPORT_SUFFIX};
use crate::log_capture::LogCapture;
use crate::profiler::{Profiler, ReportSettings};
use crate::{ProfileError, Result};
use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Loading,
    Profiling,
    Success,
    Failed,
}

/// Records the states a run went through.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    transitions: Vec<PipelineState>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            transitions: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(PipelineState::Idle)
    }

    pub fn advance(&mut self, next: PipelineState) {
        debug!("Pipeline {:?} -> {:?}", self.state(), next);
        self.transitions.push(next);
    }

    pub fn transitions(&self) -> &[PipelineState] {
        &self.transitions
    }
}

/// A generated report ready to be offered for download or viewed inline.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub html: String,
    /// The same report as pretty JSON.
    pub json: String,
    /// Where the report was written, if persisting is enabled.
    pub path: Option<PathBuf>,
    pub generated_at: DateTime<Utc>,
}

impl ReportArtifact {
    pub const MIME: &'static str = "text/html";

    pub fn mime(&self) -> &'static str {
        Self::MIME
    }

    pub fn size(&self) -> usize {
        self.html.len()
    }
}

/// Result of one generation attempt plus the log captured while it ran.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub result: Result<ReportArtifact>,
    pub log: String,
    pub run: PipelineRun,
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn artifact(&self) -> Option<&ReportArtifact> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ProfileError> {
        self.result.as_ref().err()
    }
}

/// Outcome of a full upload-to-report cycle.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The file could not be loaded; nothing was profiled.
    Rejected { error: ProfileError, run: PipelineRun },
    Completed {
        table: DataFrame,
        generation: GenerationOutcome,
    },
}

impl PipelineOutcome {
    pub fn table(&self) -> Option<&DataFrame> {
        match self {
            PipelineOutcome::Completed { table, .. } => Some(table),
            PipelineOutcome::Rejected { .. } => None,
        }
    }

    pub fn generation(&self) -> Option<&GenerationOutcome> {
        match self {
            PipelineOutcome::Completed { generation, .. } => Some(generation),
            PipelineOutcome::Rejected { .. } => None,
        }
    }

    pub fn run(&self) -> &PipelineRun {
        match self {
            PipelineOutcome::Rejected { run, .. } => run,
            PipelineOutcome::Completed { generation, .. } => &generation.run,
        }
    }
}

pub struct ReportOrchestrator {
    profiler: Arc<dyn Profiler>,
    settings: ReportSettings,
    output_dir: Option<PathBuf>,
}

impl ReportOrchestrator {
    pub fn new(profiler: Arc<dyn Profiler>, settings: ReportSettings) -> Self {
        Self {
            profiler,
            settings,
            output_dir: None,
        }
    }

    /// Persist each generated report as `<dir>/<base_name>_report.html`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn output_dir(&self) -> Option<&PathBuf> {
        self.output_dir.as_ref()
    }

    /// Run the whole cycle for one uploaded file.
    pub fn process(&self, upload: &UploadedFile) -> PipelineOutcome {
        let mut run = PipelineRun::new();
        run.advance(PipelineState::Loading);

        let table = match data_source::load(upload) {
            Ok(table) => table,
            Err(error) => {
                warn!("Rejected {}: {}", upload.name, error);
                run.advance(PipelineState::Idle);
                return PipelineOutcome::Rejected { error, run };
            }
        };

        let generation = self.generate_with_run(&table, &upload.base_name(), run);
        PipelineOutcome::Completed { table, generation }
    }

    /// Profile `table` and render the report as `<base_name>_report.html`.
    pub fn generate(&self, table: &DataFrame, base_name: &str) -> GenerationOutcome {
        let mut run = PipelineRun::new();
        run.advance(PipelineState::Loading);
        self.generate_with_run(table, base_name, run)
    }

    fn generate_with_run(
        &self,
        table: &DataFrame,
        base_name: &str,
        mut run: PipelineRun,
    ) -> GenerationOutcome {
        let file_name = format!("{}{}", base_name, REPORT_SUFFIX);
        run.advance(PipelineState::Profiling);
        info!("Generating {} with {}", file_name, self.profiler.name());

        let capture = LogCapture::new();
        let rendered = capture.run(|console| {
            let profiled = catch_unwind(AssertUnwindSafe(|| {
                self.profiler.profile(table, &self.settings, console)
            }));
            match profiled {
                Ok(Ok(report)) => {
                    info!("Rendering HTML report");
                    Ok((report.to_html(), report.to_json()?))
                }
                Ok(Err(e)) => Err(ProfileError::profiling(e)),
                Err(panic) => Err(ProfileError::profiling(anyhow::anyhow!(
                    "profiler panicked: {}",
                    panic_message(panic.as_ref())
                ))),
            }
        });
        let log = capture.finish();

        let result = rendered.and_then(|(html, json)| self.persist(file_name, html, json));
        match &result {
            Ok(artifact) => {
                info!("Report {} ready ({} bytes)", artifact.file_name, artifact.size());
                run.advance(PipelineState::Success);
            }
            Err(e) => {
                error!("Report generation failed: {}", e);
                run.advance(PipelineState::Failed);
            }
        }
        run.advance(PipelineState::Idle);

        GenerationOutcome { result, log, run }
    }

    fn persist(&self, file_name: String, html: String, json: String) -> Result<ReportArtifact> {
        let path = match &self.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let path = dir.join(&file_name);
                if path.exists() {
                    warn!("Overwriting existing report {}", path.display());
                }
                std::fs::write(&path, &html)?;
                Some(path)
            }
            None => None,
        };
        Ok(ReportArtifact {
            file_name,
            html,
            json,
            path,
            generated_at: Utc::now(),
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::DescriptiveProfiler;
    use crate::report::ProfileReport;
    use std::io::Write;

    struct FailingProfiler;

    impl Profiler for FailingProfiler {
        fn name(&self) -> &str {
            "failing"
        }

        fn profile(
            &self,
            _table: &DataFrame,
            _settings: &ReportSettings,
            console: &mut dyn Write,
        ) -> anyhow::Result<ProfileReport> {
            writeln!(console, "allocating buffers")?;
            anyhow::bail!("memory limit exceeded")
        }
    }

    fn orchestrator(profiler: Arc<dyn Profiler>) -> ReportOrchestrator {
        ReportOrchestrator::new(profiler, ReportSettings::default())
    }

    #[test]
    fn test_transitions_on_success() {
        let upload = UploadedFile::new("data.csv", "a,b\n1,2\n3,4\n");
        let outcome = orchestrator(Arc::new(DescriptiveProfiler::new())).process(&upload);
        assert_eq!(
            outcome.run().transitions(),
            &[
                PipelineState::Idle,
                PipelineState::Loading,
                PipelineState::Profiling,
                PipelineState::Success,
                PipelineState::Idle,
            ]
        );
        let artifact = outcome.generation().unwrap().artifact().unwrap();
        assert_eq!(artifact.file_name, "data_report.html");
        assert_eq!(artifact.mime(), "text/html");
        assert!(artifact.path.is_none());
    }

    #[test]
    fn test_rejected_upload_never_profiles() {
        let upload = UploadedFile::new("notes.txt", "hello");
        let outcome = orchestrator(Arc::new(FailingProfiler)).process(&upload);
        match &outcome {
            PipelineOutcome::Rejected { error, run } => {
                assert_eq!(error.to_string(), "Unsupported file format");
                assert!(!run.transitions().contains(&PipelineState::Profiling));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_keeps_log_and_description() {
        let table = data_source::load_csv(b"a\n1\n").unwrap();
        let outcome = orchestrator(Arc::new(FailingProfiler)).generate(&table, "data");
        assert!(!outcome.is_success());
        assert_eq!(outcome.run.state(), PipelineState::Idle);
        assert!(outcome.run.transitions().contains(&PipelineState::Failed));
        let message = outcome.error().unwrap().user_message();
        assert!(message.contains("memory limit exceeded"));
        assert!(outcome.log.contains("allocating buffers"));
    }

    #[test]
    fn test_panicking_profiler_is_reported_as_failure() {
        struct PanickingProfiler;
        impl Profiler for PanickingProfiler {
            fn name(&self) -> &str {
                "panicking"
            }
            fn profile(
                &self,
                _table: &DataFrame,
                _settings: &ReportSettings,
                _console: &mut dyn Write,
            ) -> anyhow::Result<ProfileReport> {
                panic!("index out of range")
            }
        }

        let table = data_source::load_csv(b"a\n1\n").unwrap();
        let outcome = orchestrator(Arc::new(PanickingProfiler)).generate(&table, "data");
        let message = outcome.error().unwrap().to_string();
        assert!(message.contains("index out of range"));
    }
}
