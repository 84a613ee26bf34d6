use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dataprofile_core::frame::{column_names, rows_text};
use dataprofile_core::{
    to_split_json, AppConfig, DataFrame, DescriptiveProfiler, PipelineOutcome, ReportOrchestrator,
    UploadedFile,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "dataprofile-cli")]
#[command(about = "Profile a CSV or JSON file into an HTML report")]
pub struct Cli {
    /// Configuration file (defaults to $DATAPROFILE_CONFIG or ./dataprofile.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, preview and profile a file, writing `<name>_report.html`
    Profile {
        #[arg(short, long)]
        file: PathBuf,
        /// Directory receiving the report (overrides the configured one)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(short, long)]
        title: Option<String>,
        /// Skip text statistics and rank correlations
        #[arg(long)]
        minimal: bool,
        /// Print a machine-readable summary instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the first rows of a file
    Preview {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long, default_value = "5")]
        rows: usize,
    },
}

pub struct ProfileArgs {
    pub file: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub title: Option<String>,
    pub minimal: bool,
    pub json: bool,
}

fn build_orchestrator(config: &AppConfig, args: &ProfileArgs) -> ReportOrchestrator {
    let mut report = config.report.clone();
    if let Some(title) = &args.title {
        report.title = title.clone();
    }
    if args.minimal {
        report.explorative = false;
    }

    let orchestrator =
        ReportOrchestrator::new(Arc::new(DescriptiveProfiler::new()), report.settings());
    match args.output_dir.clone().or_else(|| report.output_dir()) {
        Some(dir) => orchestrator.with_output_dir(dir),
        None => orchestrator,
    }
}

pub async fn profile_command(config: &AppConfig, args: ProfileArgs) -> Result<()> {
    info!("Profiling {}", args.file.display());

    let upload = UploadedFile::from_path(&args.file)?;
    let file_name = upload.name.clone();
    let orchestrator = build_orchestrator(config, &args);
    // Log capture is bound to the profiling thread
    let outcome = tokio::task::spawn_blocking(move || orchestrator.process(&upload)).await?;

    let (table, generation) = match outcome {
        PipelineOutcome::Rejected { error, .. } => return Err(anyhow!(error.user_message())),
        PipelineOutcome::Completed { table, generation } => (table, generation),
    };
    let preview = table.head(Some(config.ui.preview_rows));

    if args.json {
        let artifact = generation.artifact();
        let summary = json!({
            "success": generation.is_success(),
            "file_name": file_name,
            "report_file_name": artifact.map(|a| a.file_name.clone()),
            "report_path": artifact.and_then(|a| a.path.as_ref()).map(|p| p.display().to_string()),
            "rows": table.height(),
            "columns": table.width(),
            "preview": to_split_json(&preview)?,
            "error": generation.error().map(|e| e.user_message()),
            "log": generation.log,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("📊 Here's a preview of your data:");
        println!("{}", format_preview(&preview)?);
        println!("Generating profiling report...");
        if let Some(artifact) = generation.artifact() {
            println!("✓ Profile report generated successfully!");
            match &artifact.path {
                Some(path) => println!("Report written to {}", path.display()),
                None => println!(
                    "Report {} kept in memory ({} bytes)",
                    artifact.file_name,
                    artifact.size()
                ),
            }
        }
        println!();
        println!("Profiling log");
        println!("=============");
        print!("{}", generation.log);
    }

    match generation.result {
        Ok(_) => Ok(()),
        Err(e) => Err(anyhow!(e.user_message())),
    }
}

pub async fn preview_command(file: PathBuf, rows: usize) -> Result<()> {
    let upload = UploadedFile::from_path(&file)?;
    let table = dataprofile_core::load(&upload).map_err(|e| anyhow!(e.user_message()))?;

    println!(
        "{} ({} rows x {} columns)",
        upload.name,
        table.height(),
        table.width()
    );
    println!("{}", format_preview(&table.head(Some(rows)))?);
    Ok(())
}

/// Plain-text table with an index column and left-aligned cells.
pub fn format_preview(df: &DataFrame) -> Result<String> {
    let mut header = vec![String::new()];
    header.extend(column_names(df));

    let mut lines: Vec<Vec<String>> = vec![header];
    for (index, row) in rows_text(df)?.into_iter().enumerate() {
        let mut line = vec![index.to_string()];
        line.extend(row);
        lines.push(line);
    }

    let widths: Vec<usize> = (0..lines[0].len())
        .map(|i| {
            lines
                .iter()
                .map(|line| line[i].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    Ok(lines
        .iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n"))
}
