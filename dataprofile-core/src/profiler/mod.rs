//! Profiling capability consumed by the orchestrator

mod descriptive;

pub use descriptive::DescriptiveProfiler;

use crate::report::ProfileReport;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Knobs passed to a profiler for one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub title: String,
    /// Enables rank correlations and free-text detection.
    pub explorative: bool,
    pub top_values: usize,
    pub histogram_bins: usize,
    pub sample_rows: usize,
    pub high_correlation_threshold: f64,
    pub missing_alert_threshold: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "Data Profiling Report".to_string(),
            explorative: true,
            top_values: 10,
            histogram_bins: 10,
            sample_rows: 10,
            high_correlation_threshold: 0.9,
            missing_alert_threshold: 0.2,
        }
    }
}

/// Computes a report from a loaded data frame.
///
/// `console` stands in for the implementation's standard output; anything
/// written there ends up in the captured log. Errors are of any kind and are
/// reported to the user with their description only.
pub trait Profiler: Send + Sync {
    fn name(&self) -> &str;

    fn profile(
        &self,
        df: &DataFrame,
        settings: &ReportSettings,
        console: &mut dyn Write,
    ) -> anyhow::Result<ProfileReport>;
}
