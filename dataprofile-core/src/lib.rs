//! DataProfile: load a CSV or JSON upload, profile it, render an HTML report

pub mod config;
pub mod data_source;
pub mod errors;
pub mod frame;
pub mod log_capture;
pub mod logger;
pub mod orchestrator;
pub mod profiler;
pub mod report;

// Re-exports
pub use config::{load_config, AppConfig};
pub use data_source::{load, FileFormat, UploadedFile, REPORT_SUFFIX};
pub use errors::{ErrorKind, ProfileError, Result};
pub use frame::{cell_text, to_split_json};
pub use log_capture::{LineForwarder, LogBuffer, LogCapture, PROFILING_TARGET};
pub use orchestrator::{
    GenerationOutcome, PipelineOutcome, PipelineRun, PipelineState, ReportArtifact,
    ReportOrchestrator,
};
pub use polars::prelude::DataFrame;
pub use profiler::{DescriptiveProfiler, Profiler, ReportSettings};
pub use report::ProfileReport;

use std::sync::Arc;

/// Orchestrator wired from configuration with the bundled profiler.
pub fn orchestrator_from_config(config: &AppConfig) -> ReportOrchestrator {
    let orchestrator = ReportOrchestrator::new(
        Arc::new(DescriptiveProfiler::new()),
        config.report.settings(),
    );
    match config.report.output_dir() {
        Some(dir) => orchestrator.with_output_dir(dir),
        None => orchestrator,
    }
}
