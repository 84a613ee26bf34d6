use super::{Profiler, ReportSettings};
use crate::frame::{cell_text, column_names, rows_text};
use crate::report::{
    Alert, AlertKind, CorrelationMatrix, CorrelationMethod, DatasetOverview, HistogramBin,
    KindCount, LengthStats, MissingSummary, NumericStats, ProfileReport, Quantile, Sample,
    ValueCount, VariableKind, VariableSummary,
};
use anyhow::bail;
use chrono::Utc;
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Write;
use tracing::{debug, info};

const QUANTILES: [f64; 5] = [0.05, 0.25, 0.5, 0.75, 0.95];
const ZEROS_ALERT_THRESHOLD: f64 = 0.1;
const TEXT_MIN_DISTINCT: usize = 50;

/// Built-in profiler: univariate summaries, correlations, missing values and alerts.
#[derive(Debug, Default, Clone)]
pub struct DescriptiveProfiler;

impl DescriptiveProfiler {
    pub fn new() -> Self {
        Self
    }
}

impl Profiler for DescriptiveProfiler {
    fn name(&self) -> &str {
        "dataprofile descriptive profiler"
    }

    fn profile(
        &self,
        df: &DataFrame,
        settings: &ReportSettings,
        console: &mut dyn Write,
    ) -> anyhow::Result<ProfileReport> {
        if df.width() == 0 || df.height() == 0 {
            bail!("Empty reports are not supported: the dataset has no rows or no columns");
        }
        info!("Profiling {} rows x {} columns", df.height(), df.width());

        let total = df.width();
        let mut variables = Vec::with_capacity(total);
        for (i, column) in df.get_columns().iter().enumerate() {
            writeln!(
                console,
                "Summarize dataset: {}/{} [describe variable: {}]",
                i + 1,
                total,
                column.name()
            )?;
            variables.push(describe_series(column.as_materialized_series(), settings)?);
        }

        writeln!(console, "Summarize dataset: computing correlations")?;
        let correlations = correlations(df, &variables, settings)?;

        writeln!(console, "Summarize dataset: detecting duplicates")?;
        let overview = overview(df, &variables)?;
        let missing = variables
            .iter()
            .map(|v| MissingSummary {
                column: v.name.clone(),
                missing: v.missing,
                pct: v.missing_pct,
            })
            .collect();

        let alerts = alerts(&variables, &correlations, settings);
        debug!("Raised {} alerts", alerts.len());

        writeln!(console, "Generate report structure: done")?;
        Ok(ProfileReport {
            title: settings.title.clone(),
            generated_at: Utc::now(),
            profiler: self.name().to_string(),
            overview,
            variables,
            correlations,
            missing,
            alerts,
            sample: sample(df, settings.sample_rows)?,
        })
    }
}

fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn infer_kind(dtype: &DataType, count: usize, distinct: usize, explorative: bool) -> VariableKind {
    if count == 0 {
        return VariableKind::Empty;
    }
    match dtype {
        DataType::Boolean => VariableKind::Boolean,
        dtype if is_numeric(dtype) => VariableKind::Numeric,
        DataType::String
            if explorative
                && distinct >= TEXT_MIN_DISTINCT
                && fraction(distinct, count) >= 0.5 =>
        {
            VariableKind::Text
        }
        _ => VariableKind::Categorical,
    }
}

/// Display values with their frequency, most frequent first, ties by value.
fn ranked_values(present: &Series) -> PolarsResult<Vec<(usize, String)>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for i in 0..present.len() {
        *counts.entry(cell_text(&present.get(i)?)).or_insert(0) += 1;
    }
    let mut ranked: Vec<(usize, String)> = counts
        .into_iter()
        .map(|(value, count)| (count, value))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(ranked)
}

fn describe_series(series: &Series, settings: &ReportSettings) -> PolarsResult<VariableSummary> {
    let rows = series.len();
    let missing = series.null_count();
    let present = series.drop_nulls();
    let count = present.len();
    let distinct = if count == 0 { 0 } else { present.n_unique()? };
    let kind = infer_kind(series.dtype(), count, distinct, settings.explorative);

    let ranked = ranked_values(&present)?;
    let mode = ranked.first().map(|(_, value)| value.clone());

    let numeric = match kind {
        VariableKind::Numeric => numeric_stats(&present, settings.histogram_bins)?,
        _ => None,
    };

    let top_values = match kind {
        VariableKind::Numeric => Vec::new(),
        _ => ranked
            .iter()
            .take(settings.top_values)
            .map(|(n, value)| ValueCount {
                value: value.clone(),
                count: *n,
                pct: fraction(*n, count),
            })
            .collect(),
    };

    let length = match kind {
        VariableKind::Categorical | VariableKind::Text => length_stats(&ranked),
        _ => None,
    };

    debug!(
        "Column {}: {} ({} distinct, {} missing)",
        series.name(),
        kind,
        distinct,
        missing
    );

    Ok(VariableSummary {
        name: series.name().to_string(),
        kind,
        count,
        missing,
        missing_pct: fraction(missing, rows),
        distinct,
        distinct_pct: fraction(distinct, count),
        is_unique: count > 0 && distinct == count,
        mode,
        numeric,
        top_values,
        length,
    })
}

fn numeric_stats(present: &Series, bins: usize) -> PolarsResult<Option<NumericStats>> {
    let floats = present.cast(&DataType::Float64)?;
    let values = floats.f64()?;
    let (Some(mean), Some(min), Some(max)) = (values.mean(), values.min(), values.max()) else {
        return Ok(None);
    };

    let mut quantiles = Vec::with_capacity(QUANTILES.len());
    for q in QUANTILES {
        if let Some(value) = values.quantile(q, QuantileMethod::Linear)? {
            quantiles.push(Quantile { q, value });
        }
    }
    let q1 = values.quantile(0.25, QuantileMethod::Linear)?.unwrap_or(min);
    let q3 = values.quantile(0.75, QuantileMethod::Linear)?.unwrap_or(max);

    let std = values.std(1);
    let zeros = values.into_iter().flatten().filter(|v| *v == 0.0).count();
    let negatives = values.into_iter().flatten().filter(|v| *v < 0.0).count();

    Ok(Some(NumericStats {
        mean,
        std,
        variance: values.var(1),
        min,
        max,
        range: max - min,
        sum: values.sum().unwrap_or(0.0),
        zeros,
        zeros_pct: fraction(zeros, values.len()),
        negatives,
        negatives_pct: fraction(negatives, values.len()),
        quantiles,
        iqr: q3 - q1,
        coefficient_of_variation: std.filter(|_| mean != 0.0).map(|s| s / mean),
        skewness: floats.skew(false)?,
        histogram: histogram(values, bins),
    }))
}

/// Equal-width bins over the finite range of the column.
fn histogram(values: &Float64Chunked, bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.into_iter().flatten().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = min + width * i as f64;
            let upper = if i + 1 == bins { max } else { lower + width };
            HistogramBin {
                lower,
                upper,
                count,
            }
        })
        .collect()
}

fn length_stats(ranked: &[(usize, String)]) -> Option<LengthStats> {
    let lengths = || ranked.iter().map(|(_, value)| value.chars().count());
    let min = lengths().min()?;
    let max = lengths().max()?;
    let total: usize = ranked.iter().map(|(n, value)| n * value.chars().count()).sum();
    let count: usize = ranked.iter().map(|(n, _)| n).sum();
    Some(LengthStats {
        min,
        mean: fraction(total, count),
        max,
    })
}

fn correlations(
    df: &DataFrame,
    variables: &[VariableSummary],
    settings: &ReportSettings,
) -> PolarsResult<Vec<CorrelationMatrix>> {
    let mut names = Vec::new();
    let mut candidates = Vec::new();
    for (column, variable) in df.get_columns().iter().zip(variables) {
        if matches!(variable.kind, VariableKind::Numeric | VariableKind::Boolean) {
            names.push(variable.name.clone());
            candidates.push(column.as_materialized_series().cast(&DataType::Float64)?);
        }
    }
    if candidates.len() < 2 {
        return Ok(Vec::new());
    }

    let mut methods = vec![CorrelationMethod::Pearson];
    if settings.explorative {
        methods.push(CorrelationMethod::Spearman);
    }

    let mut matrices = Vec::with_capacity(methods.len());
    for method in methods {
        let mut values = Vec::with_capacity(candidates.len());
        for a in &candidates {
            let mut row = Vec::with_capacity(candidates.len());
            for b in &candidates {
                row.push(pairwise(a.f64()?, b.f64()?, method)?);
            }
            values.push(row);
        }
        matrices.push(CorrelationMatrix {
            method,
            columns: names.clone(),
            values,
        });
    }
    Ok(matrices)
}

/// Coefficient over rows where both cells are present.
fn pairwise(
    a: &Float64Chunked,
    b: &Float64Chunked,
    method: CorrelationMethod,
) -> PolarsResult<Option<f64>> {
    let both = &a.is_not_null() & &b.is_not_null();
    let x = a.filter(&both)?;
    let y = b.filter(&both)?;
    Ok(match method {
        CorrelationMethod::Pearson => pearson(&x, &y),
        CorrelationMethod::Spearman => pearson(&ranks(&x), &ranks(&y)),
    })
}

fn pearson(x: &Float64Chunked, y: &Float64Chunked) -> Option<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }
    let (sx, sy) = (x.std(1)?, y.std(1)?);
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    let dx = x - x.mean()?;
    let dy = y - y.mean()?;
    let cov = (&dx * &dy).sum()? / (x.len() - 1) as f64;
    Some((cov / (sx * sy)).clamp(-1.0, 1.0))
}

/// Ranks starting at 1, ties get the average of their positions.
fn ranks(values: &Float64Chunked) -> Float64Chunked {
    let values: Vec<f64> = values.into_iter().flatten().collect();
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = rank;
        }
        i = j + 1;
    }
    Float64Chunked::from_vec("rank".into(), ranks)
}

fn overview(df: &DataFrame, variables: &[VariableSummary]) -> PolarsResult<DatasetOverview> {
    let cells = df.height() * df.width();
    let missing_cells: usize = variables.iter().map(|v| v.missing).sum();
    let distinct_rows = df
        .unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?
        .height();
    let duplicate_rows = df.height().saturating_sub(distinct_rows);

    let variable_kinds = VariableKind::ALL
        .iter()
        .map(|kind| KindCount {
            kind: *kind,
            count: variables.iter().filter(|v| v.kind == *kind).count(),
        })
        .collect();

    Ok(DatasetOverview {
        rows: df.height(),
        columns: df.width(),
        missing_cells,
        missing_cells_pct: fraction(missing_cells, cells),
        duplicate_rows,
        duplicate_rows_pct: fraction(duplicate_rows, df.height()),
        variable_kinds,
    })
}

fn alerts(
    variables: &[VariableSummary],
    correlations: &[CorrelationMatrix],
    settings: &ReportSettings,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for v in variables {
        if v.kind == VariableKind::Empty {
            alerts.push(Alert {
                kind: AlertKind::Empty,
                column: v.name.clone(),
                detail: "has only missing values".to_string(),
            });
            continue;
        }
        if v.distinct == 1 {
            alerts.push(Alert {
                kind: AlertKind::Constant,
                column: v.name.clone(),
                detail: format!(
                    "has constant value \"{}\"",
                    v.mode.clone().unwrap_or_default()
                ),
            });
        }
        if v.is_unique && v.count > 1 {
            alerts.push(Alert {
                kind: AlertKind::Unique,
                column: v.name.clone(),
                detail: "has unique values".to_string(),
            });
        }
        if v.missing_pct > settings.missing_alert_threshold {
            alerts.push(Alert {
                kind: AlertKind::Missing,
                column: v.name.clone(),
                detail: format!(
                    "has {} ({:.1}%) missing values",
                    v.missing,
                    v.missing_pct * 100.0
                ),
            });
        }
        if let Some(numeric) = &v.numeric {
            if numeric.zeros_pct > ZEROS_ALERT_THRESHOLD {
                alerts.push(Alert {
                    kind: AlertKind::Zeros,
                    column: v.name.clone(),
                    detail: format!(
                        "has {} ({:.1}%) zeros",
                        numeric.zeros,
                        numeric.zeros_pct * 100.0
                    ),
                });
            }
        }
    }

    if let Some(pearson) = correlations
        .iter()
        .find(|m| m.method == CorrelationMethod::Pearson)
    {
        for (i, a) in pearson.columns.iter().enumerate() {
            for (j, b) in pearson.columns.iter().enumerate().skip(i + 1) {
                if let Some(r) = pearson.values[i][j] {
                    if r.abs() >= settings.high_correlation_threshold {
                        alerts.push(Alert {
                            kind: AlertKind::HighCorrelation,
                            column: a.clone(),
                            detail: format!("is highly correlated with {} (r = {:.2})", b, r),
                        });
                    }
                }
            }
        }
    }
    alerts
}

fn sample(df: &DataFrame, rows: usize) -> PolarsResult<Sample> {
    Ok(Sample {
        columns: column_names(df),
        head: rows_text(&df.head(Some(rows)))?,
        tail: rows_text(&df.tail(Some(rows)))?,
    })
}
