//! HTML rendering of a [`ProfileReport`]
//!
//! Output is a single document with inline CSS and no external assets, so it can
//! be downloaded, opened from disk or embedded through `srcdoc`.

use super::{
    Alert, CorrelationMatrix, DatasetOverview, MissingSummary, NumericStats, ProfileReport,
    Sample, VariableSummary,
};

pub(super) fn render_report(report: &ProfileReport) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{title}</h1>
            <div class="meta">Generated {generated} by {profiler}</div>
            <nav>
                <a href="#overview">Overview</a>
                <a href="#alerts">Alerts</a>
                <a href="#variables">Variables</a>
                <a href="#correlations">Correlations</a>
                <a href="#missing">Missing values</a>
                <a href="#sample">Sample</a>
            </nav>
        </header>
        {overview}
        {alerts}
        {variables}
        {correlations}
        {missing}
        {sample}
    </div>
</body>
</html>"##,
        title = html_escape(&report.title),
        css = inline_css(),
        generated = report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        profiler = html_escape(&report.profiler),
        overview = render_overview(&report.overview),
        alerts = render_alerts(&report.alerts),
        variables = render_variables(&report.variables),
        correlations = render_correlations(&report.correlations),
        missing = render_missing(&report.missing),
        sample = render_sample(&report.sample),
    )
}

fn render_overview(overview: &DatasetOverview) -> String {
    let kinds: String = overview
        .variable_kinds
        .iter()
        .filter(|k| k.count > 0)
        .map(|k| format!("<tr><th>{}</th><td>{}</td></tr>", k.kind, k.count))
        .collect();

    format!(
        r#"<section class="section" id="overview">
            <h2>Overview</h2>
            <div class="summary">
                <div class="summary-card"><h3>Variables</h3><div class="value">{columns}</div></div>
                <div class="summary-card"><h3>Observations</h3><div class="value">{rows}</div></div>
                <div class="summary-card"><h3>Missing cells</h3><div class="value">{missing} ({missing_pct})</div></div>
                <div class="summary-card"><h3>Duplicate rows</h3><div class="value">{duplicates} ({duplicates_pct})</div></div>
            </div>
            <h3>Variable types</h3>
            <table class="stats">{kinds}</table>
        </section>"#,
        columns = overview.columns,
        rows = overview.rows,
        missing = overview.missing_cells,
        missing_pct = pct(overview.missing_cells_pct),
        duplicates = overview.duplicate_rows,
        duplicates_pct = pct(overview.duplicate_rows_pct),
        kinds = kinds,
    )
}

fn render_alerts(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return r#"<section class="section" id="alerts"><h2>Alerts</h2><p class="muted">No alerts.</p></section>"#
            .to_string();
    }
    let rows: String = alerts
        .iter()
        .map(|a| {
            format!(
                r#"<tr><td><code>{column}</code> {detail}</td><td><span class="badge">{kind}</span></td></tr>"#,
                column = html_escape(&a.column),
                detail = html_escape(&a.detail),
                kind = a.kind,
            )
        })
        .collect();
    format!(
        r#"<section class="section" id="alerts"><h2>Alerts <span class="count">{count}</span></h2><table>{rows}</table></section>"#,
        count = alerts.len(),
        rows = rows,
    )
}

fn render_variables(variables: &[VariableSummary]) -> String {
    let body: String = variables.iter().map(render_variable).collect();
    format!(
        r#"<section class="section" id="variables"><h2>Variables</h2>{}</section>"#,
        body
    )
}

fn render_variable(variable: &VariableSummary) -> String {
    let mut stats = vec![
        ("Distinct", format!("{} ({})", variable.distinct, pct(variable.distinct_pct))),
        ("Missing", format!("{} ({})", variable.missing, pct(variable.missing_pct))),
        ("Count", variable.count.to_string()),
    ];
    if let Some(mode) = &variable.mode {
        stats.push(("Mode", mode.clone()));
    }
    if let Some(length) = &variable.length {
        stats.push(("Min length", length.min.to_string()));
        stats.push(("Mean length", num(length.mean)));
        stats.push(("Max length", length.max.to_string()));
    }

    let detail = match &variable.numeric {
        Some(numeric) => render_numeric(numeric),
        None => render_value_counts(variable),
    };

    format!(
        r#"<div class="variable">
            <h3>{name} <span class="kind">{kind}</span>{unique}</h3>
            <div class="variable-body">
                <table class="stats">{stats}</table>
                {detail}
            </div>
        </div>"#,
        name = html_escape(&variable.name),
        kind = variable.kind,
        unique = if variable.is_unique {
            r#" <span class="badge">Unique</span>"#
        } else {
            ""
        },
        stats = stat_rows(&stats),
        detail = detail,
    )
}

fn render_numeric(numeric: &NumericStats) -> String {
    let stats = vec![
        ("Mean", num(numeric.mean)),
        ("Std. deviation", opt_num(numeric.std)),
        ("Variance", opt_num(numeric.variance)),
        ("Minimum", num(numeric.min)),
        ("Maximum", num(numeric.max)),
        ("Range", num(numeric.range)),
        ("Sum", num(numeric.sum)),
        ("IQR", num(numeric.iqr)),
        ("Coef. of variation", opt_num(numeric.coefficient_of_variation)),
        ("Skewness", opt_num(numeric.skewness)),
        ("Zeros", format!("{} ({})", numeric.zeros, pct(numeric.zeros_pct))),
        ("Negative", format!("{} ({})", numeric.negatives, pct(numeric.negatives_pct))),
    ];
    let quantile_rows: String = numeric
        .quantiles
        .iter()
        .map(|q| {
            format!(
                "<tr><th>{}th percentile</th><td>{}</td></tr>",
                (q.q * 100.0).round(),
                num(q.value)
            )
        })
        .collect();

    let max_count = numeric.histogram.iter().map(|b| b.count).max().unwrap_or(0);
    let bars: String = numeric
        .histogram
        .iter()
        .map(|bin| {
            bar_row(
                &format!("{} \u{2013} {}", num(bin.lower), num(bin.upper)),
                bin.count,
                max_count,
            )
        })
        .collect();

    format!(
        r#"<table class="stats">{stats}</table>
           <table class="stats">{quantiles}</table>
           <div class="bars"><h4>Histogram</h4><table>{bars}</table></div>"#,
        stats = stat_rows(&stats),
        quantiles = quantile_rows,
        bars = bars,
    )
}

fn render_value_counts(variable: &VariableSummary) -> String {
    if variable.top_values.is_empty() {
        return String::new();
    }
    let max_count = variable.top_values.iter().map(|v| v.count).max().unwrap_or(0);
    let bars: String = variable
        .top_values
        .iter()
        .map(|v| bar_row(&html_escape(&v.value), v.count, max_count))
        .collect();
    format!(
        r#"<div class="bars"><h4>Most frequent values</h4><table>{}</table></div>"#,
        bars
    )
}

fn render_correlations(matrices: &[CorrelationMatrix]) -> String {
    if matrices.is_empty() {
        return r#"<section class="section" id="correlations"><h2>Correlations</h2><p class="muted">Fewer than two numeric variables; no correlations computed.</p></section>"#
            .to_string();
    }
    let body: String = matrices.iter().map(render_matrix).collect();
    format!(
        r#"<section class="section" id="correlations"><h2>Correlations</h2>{}</section>"#,
        body
    )
}

fn render_matrix(matrix: &CorrelationMatrix) -> String {
    let header: String = matrix
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", html_escape(c)))
        .collect();
    let rows: String = matrix
        .columns
        .iter()
        .zip(&matrix.values)
        .map(|(name, row)| {
            let cells: String = row
                .iter()
                .map(|value| match value {
                    Some(v) => format!(
                        r#"<td class="corr" style="background:{}">{:.2}</td>"#,
                        correlation_color(*v),
                        v
                    ),
                    None => r#"<td class="corr muted">&ndash;</td>"#.to_string(),
                })
                .collect();
            format!("<tr><th>{}</th>{}</tr>", html_escape(name), cells)
        })
        .collect();
    format!(
        r#"<h3>{method}</h3><table class="matrix"><thead><tr><th></th>{header}</tr></thead><tbody>{rows}</tbody></table>"#,
        method = matrix.method,
        header = header,
        rows = rows,
    )
}

fn render_missing(missing: &[MissingSummary]) -> String {
    let rows: String = missing
        .iter()
        .map(|m| {
            format!(
                r#"<tr><th>{name}</th><td class="bar-cell"><div class="bar missing" style="width:{width:.1}%"></div></td><td>{count} ({pct})</td></tr>"#,
                name = html_escape(&m.column),
                width = m.pct * 100.0,
                count = m.missing,
                pct = pct(m.pct),
            )
        })
        .collect();
    format!(
        r#"<section class="section" id="missing"><h2>Missing values</h2><table>{}</table></section>"#,
        rows
    )
}

fn render_sample(sample: &Sample) -> String {
    let header: String = sample
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", html_escape(c)))
        .collect();
    let rows = |rows: &[Vec<String>]| -> String {
        rows.iter()
            .map(|row| {
                let cells: String = row
                    .iter()
                    .map(|c| format!("<td>{}</td>", html_escape(c)))
                    .collect();
                format!("<tr>{}</tr>", cells)
            })
            .collect()
    };
    format!(
        r#"<section class="section" id="sample">
            <h2>Sample</h2>
            <h3>First rows</h3>
            <div class="scroll"><table><thead><tr>{header}</tr></thead><tbody>{head}</tbody></table></div>
            <h3>Last rows</h3>
            <div class="scroll"><table><thead><tr>{header}</tr></thead><tbody>{tail}</tbody></table></div>
        </section>"#,
        header = header,
        head = rows(&sample.head),
        tail = rows(&sample.tail),
    )
}

fn stat_rows(stats: &[(&str, String)]) -> String {
    stats
        .iter()
        .map(|(label, value)| format!("<tr><th>{}</th><td>{}</td></tr>", label, html_escape(value)))
        .collect()
}

fn bar_row(label: &str, count: usize, max_count: usize) -> String {
    let width = if max_count == 0 {
        0.0
    } else {
        count as f64 / max_count as f64 * 100.0
    };
    format!(
        r#"<tr><th>{label}</th><td class="bar-cell"><div class="bar" style="width:{width:.1}%"></div></td><td>{count}</td></tr>"#,
    )
}

/// Blue for positive, red for negative, opacity by magnitude.
fn correlation_color(value: f64) -> String {
    let alpha = value.abs().min(1.0);
    if value >= 0.0 {
        format!("rgba(59, 130, 246, {:.2})", alpha)
    } else {
        format!("rgba(239, 68, 68, {:.2})", alpha)
    }
}

fn pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

fn num(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else if value.is_finite() && (value.abs() >= 1e6 || (value != 0.0 && value.abs() < 1e-4)) {
        format!("{:.4e}", value)
    } else if value.is_finite() {
        format!("{:.4}", value)
    } else {
        value.to_string()
    }
}

fn opt_num(value: Option<f64>) -> String {
    value.map(num).unwrap_or_else(|| "\u{2013}".to_string())
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; line-height: 1.5; color: #111827; background: #ffffff; }
.container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
header { margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 2px solid #e5e7eb; }
header h1 { font-size: 2rem; font-weight: 700; margin-bottom: 0.25rem; }
header .meta { color: #6b7280; font-size: 0.875rem; }
nav { margin-top: 0.75rem; }
nav a { margin-right: 1rem; color: #2563eb; text-decoration: none; font-size: 0.875rem; }
.section { margin-bottom: 2.5rem; }
.section h2 { font-size: 1.5rem; font-weight: 700; margin-bottom: 1rem; }
.section h3 { font-size: 1.1rem; margin: 1rem 0 0.5rem; }
.summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; margin-bottom: 1rem; }
.summary-card { background: #f9fafb; padding: 1rem; border-radius: 0.5rem; border-left: 4px solid #3b82f6; }
.summary-card h3 { font-size: 0.875rem; font-weight: 600; color: #6b7280; margin: 0 0 0.5rem; }
.summary-card .value { font-size: 1.25rem; font-weight: 700; }
table { border-collapse: collapse; margin-bottom: 0.75rem; }
th, td { padding: 0.35rem 0.75rem; border-bottom: 1px solid #e5e7eb; font-size: 0.875rem; text-align: left; }
table.stats th { color: #374151; font-weight: 600; }
.variable { border: 1px solid #e5e7eb; border-radius: 0.5rem; padding: 1rem; margin-bottom: 1rem; }
.variable-body { display: flex; flex-wrap: wrap; gap: 1.5rem; align-items: flex-start; }
.kind { font-size: 0.75rem; color: #6b7280; font-weight: 400; margin-left: 0.5rem; }
.badge { background: #fef3c7; color: #92400e; border-radius: 0.25rem; padding: 0.1rem 0.4rem; font-size: 0.75rem; }
.count { background: #e5e7eb; border-radius: 999px; padding: 0 0.5rem; font-size: 0.875rem; }
.bars h4 { font-size: 0.875rem; margin-bottom: 0.25rem; }
.bar-cell { width: 220px; }
.bar { height: 0.8rem; background: #3b82f6; border-radius: 2px; }
.bar.missing { background: #f59e0b; }
.matrix td.corr { text-align: center; min-width: 3.5rem; }
.muted { color: #9ca3af; }
.scroll { overflow-x: auto; }
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(num(3.0), "3");
        assert_eq!(num(2.5), "2.5000");
        assert_eq!(num(f64::NAN), "NaN");
        assert_eq!(opt_num(None), "\u{2013}");
        assert_eq!(pct(0.25), "25.0%");
    }
}
