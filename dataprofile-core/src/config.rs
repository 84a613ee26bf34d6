//! Layered application configuration: defaults, optional TOML file, environment

use crate::profiler::ReportSettings;
use crate::Result;
use config as config_rs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "dataprofile.toml";
pub const CONFIG_PATH_ENV: &str = "DATAPROFILE_CONFIG";
pub const ENV_PREFIX: &str = "DATAPROFILE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub report: ReportConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8501".to_string(),
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub explorative: bool,
    /// Directory receiving `<base_name>_report.html`; empty disables writing.
    pub output_dir: String,
    pub top_values: usize,
    pub sample_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let defaults = ReportSettings::default();
        Self {
            title: defaults.title,
            explorative: defaults.explorative,
            output_dir: ".".to_string(),
            top_values: defaults.top_values,
            sample_rows: defaults.sample_rows,
        }
    }
}

impl ReportConfig {
    pub fn settings(&self) -> ReportSettings {
        ReportSettings {
            title: self.title.clone(),
            explorative: self.explorative,
            top_values: self.top_values,
            sample_rows: self.sample_rows,
            ..ReportSettings::default()
        }
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        let dir = self.output_dir.trim();
        if dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(dir))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub app_title: String,
    pub author_name: String,
    pub author_url: String,
    pub repository_url: String,
    pub preview_rows: usize,
    pub viewport_height: u32,
    pub report_cache_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            app_title: "Data Profiling".to_string(),
            author_name: "Livia Ellen".to_string(),
            author_url: "https://github.com/liviaellen/data-profiling".to_string(),
            repository_url: "https://github.com/liviaellen/data-profiling".to_string(),
            preview_rows: 5,
            viewport_height: 800,
            report_cache_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load configuration from `path` (or `DATAPROFILE_CONFIG`, or `dataprofile.toml`
/// when present) with `DATAPROFILE_<SECTION>__<KEY>` environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = config_rs::Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(config_rs::File::from(path.to_path_buf()).required(true));
        }
        None => {
            let default_path =
                std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
            builder = builder.add_source(config_rs::File::with_name(&default_path).required(false));
        }
    }

    builder = builder.add_source(
        config_rs::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder.build()?;
    Ok(cfg.try_deserialize::<AppConfig>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address, "127.0.0.1:8501");
        assert_eq!(config.ui.preview_rows, 5);
        assert_eq!(config.ui.viewport_height, 800);
        assert_eq!(config.report.output_dir(), Some(PathBuf::from(".")));
        assert!(config.report.settings().explorative);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[report]\ntitle = \"Quarterly data\"\noutput_dir = \"\"\n\n[ui]\npreview_rows = 3\n"
        )
        .unwrap();
        file.flush().unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.report.title, "Quarterly data");
        assert_eq!(config.report.output_dir(), None);
        assert_eq!(config.ui.preview_rows, 3);
        assert_eq!(config.ui.viewport_height, 800);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/dataprofile.toml")));
        assert!(result.is_err());
    }
}
