//! Error types for DataProfile

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProfileError>;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Unsupported file format")]
    UnsupportedFormat { file_name: String },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("{description}")]
    Profiling {
        description: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Data frame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}

/// Coarse classification shown to users and mapped to HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    MalformedInput,
    ProfilingFailure,
    Internal,
}

impl ProfileError {
    /// Wrap any error raised by a profiler, keeping its text as the description.
    pub fn profiling(source: anyhow::Error) -> Self {
        ProfileError::Profiling {
            description: source.to_string(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProfileError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ProfileError::MalformedInput(_)
            | ProfileError::Csv(_)
            | ProfileError::Polars(_)
            | ProfileError::Serialization(_) => ErrorKind::MalformedInput,
            ProfileError::Profiling { .. } => ErrorKind::ProfilingFailure,
            ProfileError::Io(_) | ProfileError::Configuration(_) => ErrorKind::Internal,
        }
    }

    /// Text rendered inline by the front-ends.
    pub fn user_message(&self) -> String {
        match self {
            ProfileError::UnsupportedFormat { .. } => self.to_string(),
            ProfileError::MalformedInput(detail) => format!("Could not read file: {}", detail),
            ProfileError::Csv(e) => format!("Could not read file: {}", e),
            ProfileError::Polars(e) => format!("Could not read file: {}", e),
            ProfileError::Serialization(e) => format!("Could not read file: {}", e),
            other => format!("An error occurred during profiling: {}", other),
        }
    }
}
