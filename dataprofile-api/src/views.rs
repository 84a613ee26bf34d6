//! Server-rendered pages for the upload form and the profiling result

use crate::services::ProfileRun;
use dataprofile_core::config::UiConfig;
use dataprofile_core::frame::{column_names, rows_text};
use dataprofile_core::report::html_escape;
use dataprofile_core::{DataFrame, FileFormat, GenerationOutcome, PipelineOutcome};
use std::fmt::Write;
use tracing::warn;
use uuid::Uuid;

pub const STATUS_GENERATING: &str = "Generating profiling report...";
pub const STATUS_SUCCESS: &str = "Profile report generated successfully!";

/// The upload page with no result yet.
pub fn render_index(ui: &UiConfig) -> String {
    render_page(ui, "")
}

/// The upload page followed by the outcome of `run`.
pub fn render_result(ui: &UiConfig, run: &ProfileRun) -> String {
    let mut section = String::new();
    match &run.outcome {
        PipelineOutcome::Rejected { error, .. } => {
            alert(&mut section, "error", &error.user_message());
        }
        PipelineOutcome::Completed { generation, .. } => {
            section.push_str("<h3>Here's a preview of your data:</h3>\n");
            if let Some(preview) = &run.preview {
                section.push_str(&render_preview(preview));
            }
            let _ = writeln!(section, "<p class=\"status\">{}</p>", STATUS_GENERATING);
            render_generation(&mut section, ui, generation, run.report_id);
        }
    }
    render_page(ui, &section)
}

fn render_generation(
    out: &mut String,
    ui: &UiConfig,
    generation: &GenerationOutcome,
    report_id: Option<Uuid>,
) {
    match (generation.artifact(), report_id) {
        (Some(artifact), Some(id)) => {
            alert(out, "success", STATUS_SUCCESS);
            let _ = writeln!(
                out,
                "<p class=\"actions\"><a class=\"button\" href=\"/reports/{id}/download\" download=\"{name}\" type=\"{mime}\">Download HTML report</a> \
                 <a href=\"/reports/{id}\" target=\"_blank\" rel=\"noopener\">Open HTML report in new tab</a></p>",
                id = id,
                name = html_escape(&artifact.file_name),
                mime = artifact.mime(),
            );
            let _ = writeln!(
                out,
                "<iframe class=\"report\" title=\"{name}\" srcdoc=\"{html}\" style=\"height: {height}px\" scrolling=\"yes\"></iframe>",
                name = html_escape(&artifact.file_name),
                html = html_escape(&artifact.html),
                height = ui.viewport_height,
            );
        }
        _ => {
            let message = generation
                .error()
                .map(|e| e.user_message())
                .unwrap_or_else(|| "An error occurred during profiling: report unavailable".to_string());
            alert(out, "error", &message);
        }
    }
    let _ = writeln!(
        out,
        "<h4>Profiling log</h4>\n<pre class=\"log\">{}</pre>",
        html_escape(&generation.log)
    );
}

fn alert(out: &mut String, class: &str, message: &str) {
    let _ = writeln!(
        out,
        "<div class=\"alert {}\">{}</div>",
        class,
        html_escape(message)
    );
}

/// Preview rows as an HTML table with a leading index column.
pub fn render_preview(df: &DataFrame) -> String {
    let mut out = String::from("<table class=\"preview\">\n<thead><tr><th></th>");
    for name in column_names(df) {
        let _ = write!(out, "<th>{}</th>", html_escape(&name));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    let rows = rows_text(df).unwrap_or_else(|e| {
        warn!("Preview rows unavailable: {}", e);
        Vec::new()
    });
    for (index, row) in rows.iter().enumerate() {
        let _ = write!(out, "<tr><th>{}</th>", index);
        for cell in row {
            let _ = write!(out, "<td>{}</td>", html_escape(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn accepted_extensions() -> String {
    FileFormat::ACCEPTED
        .iter()
        .map(|format| format.extension())
        .collect::<Vec<_>>()
        .join(",")
}

fn render_page(ui: &UiConfig, result: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<main class="container">
<h1>{title} - {author}</h1>
<p class="caption">This app profiles an uploaded CSV or JSON file and renders an interactive HTML report.</p>
<p>Created with &#128153; by <a href="{author_url}">{author}</a></p>
<p>Find the code <a href="{repository_url}">here</a></p>
<form method="post" action="/profile" enctype="multipart/form-data">
<label for="file"><strong>Upload your CSV or JSON file for profiling</strong></label>
<input type="file" id="file" name="file" accept="{accept}" required>
<button type="submit">Profile</button>
</form>
<section class="result">
{result}</section>
</main>
</body>
</html>
"#,
        title = html_escape(&ui.app_title),
        author = html_escape(&ui.author_name),
        author_url = html_escape(&ui.author_url),
        repository_url = html_escape(&ui.repository_url),
        accept = accepted_extensions(),
        css = PAGE_CSS,
        result = result,
    )
}

const PAGE_CSS: &str = r#"
body { font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; color: #111827; margin: 0; }
.container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
.caption { color: #6b7280; }
form { margin: 1.5rem 0; padding: 1rem; border: 1px dashed #9ca3af; border-radius: 0.5rem; }
form label { display: block; margin-bottom: 0.5rem; }
table.preview { border-collapse: collapse; margin-bottom: 1rem; }
table.preview th, table.preview td { padding: 0.3rem 0.75rem; border-bottom: 1px solid #e5e7eb; text-align: left; }
.status { color: #6b7280; }
.alert { padding: 0.75rem 1rem; border-radius: 0.5rem; margin: 1rem 0; }
.alert.success { background: #dcfce7; color: #166534; }
.alert.error { background: #fee2e2; color: #991b1b; }
.button { background: #2563eb; color: #ffffff; padding: 0.4rem 0.8rem; border-radius: 0.375rem; text-decoration: none; }
iframe.report { width: 100%; border: 1px solid #e5e7eb; }
pre.log { background: #f3f4f6; padding: 0.75rem; overflow-x: auto; font-size: 0.8rem; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use dataprofile_core::data_source::load_csv;

    #[test]
    fn test_index_lists_accepted_formats_and_links() {
        let ui = UiConfig::default();
        let page = render_index(&ui);
        assert!(page.contains("accept=\".csv,.json\""));
        assert!(page.contains(&ui.repository_url));
        assert!(page.contains("Upload your CSV or JSON file for profiling"));
        assert!(!page.contains(STATUS_GENERATING));
    }

    #[test]
    fn test_preview_escapes_cells() {
        let df = load_csv(b"name,score\n<b>Ann</b>,3\nBo,\n").unwrap();
        let html = render_preview(&df);
        assert!(html.contains("&lt;b&gt;Ann&lt;/b&gt;"));
        assert!(html.contains("<td>NaN</td>"));
        assert!(html.contains("<th>1</th>"));
    }
}
