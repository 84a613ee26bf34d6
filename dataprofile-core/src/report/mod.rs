//! Profiling report model and its serialized forms

mod html;

use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

pub use html::html_escape;

/// Result of profiling one table.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub profiler: String,
    pub overview: DatasetOverview,
    pub variables: Vec<VariableSummary>,
    pub correlations: Vec<CorrelationMatrix>,
    pub missing: Vec<MissingSummary>,
    pub alerts: Vec<Alert>,
    pub sample: Sample,
}

impl ProfileReport {
    /// Self-contained HTML document.
    pub fn to_html(&self) -> String {
        html::render_report(self)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSummary> {
        self.variables.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub missing_cells_pct: f64,
    pub duplicate_rows: usize,
    pub duplicate_rows_pct: f64,
    pub variable_kinds: Vec<KindCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindCount {
    pub kind: VariableKind,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Numeric,
    Boolean,
    Categorical,
    Text,
    Empty,
}

impl VariableKind {
    pub const ALL: [VariableKind; 5] = [
        VariableKind::Numeric,
        VariableKind::Boolean,
        VariableKind::Categorical,
        VariableKind::Text,
        VariableKind::Empty,
    ];
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VariableKind::Numeric => "Numeric",
            VariableKind::Boolean => "Boolean",
            VariableKind::Categorical => "Categorical",
            VariableKind::Text => "Text",
            VariableKind::Empty => "Empty",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableSummary {
    pub name: String,
    pub kind: VariableKind,
    pub count: usize,
    pub missing: usize,
    pub missing_pct: f64,
    pub distinct: usize,
    pub distinct_pct: f64,
    pub is_unique: bool,
    pub mode: Option<String>,
    pub numeric: Option<NumericStats>,
    pub top_values: Vec<ValueCount>,
    pub length: Option<LengthStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NumericStats {
    pub mean: f64,
    pub std: Option<f64>,
    pub variance: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub sum: f64,
    pub zeros: usize,
    pub zeros_pct: f64,
    pub negatives: usize,
    pub negatives_pct: f64,
    pub quantiles: Vec<Quantile>,
    pub iqr: f64,
    pub coefficient_of_variation: Option<f64>,
    pub skewness: Option<f64>,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quantile {
    pub q: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LengthStats {
    pub min: usize,
    pub mean: f64,
    pub max: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationMethod::Pearson => f.write_str("Pearson's r"),
            CorrelationMethod::Spearman => f.write_str("Spearman's \u{03c1}"),
        }
    }
}

/// Square matrix over `columns`; `None` where the coefficient is undefined.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub method: CorrelationMethod,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingSummary {
    pub column: String,
    pub missing: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Constant,
    Unique,
    Missing,
    Zeros,
    HighCorrelation,
    Empty,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertKind::Constant => "Constant",
            AlertKind::Unique => "Unique",
            AlertKind::Missing => "Missing",
            AlertKind::Zeros => "Zeros",
            AlertKind::HighCorrelation => "High correlation",
            AlertKind::Empty => "Empty",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub column: String,
    pub detail: String,
}

/// First and last rows rendered as text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sample {
    pub columns: Vec<String>,
    pub head: Vec<Vec<String>>,
    pub tail: Vec<Vec<String>>,
}
