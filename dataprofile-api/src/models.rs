use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart body accepted by the profile endpoints.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// A `.csv` or `.json` file.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    /// Name of the uploaded file.
    pub file_name: String,
    pub report_file_name: Option<String>,
    pub report_id: Option<Uuid>,
    pub report_url: Option<String>,
    pub download_url: Option<String>,
    pub rows: usize,
    pub columns: usize,
    /// First rows of the loaded table in `{"columns": [...], "data": [[...]]}` form.
    #[schema(value_type = Object)]
    pub preview: serde_json::Value,
    pub error: Option<String>,
    /// Console output captured while profiling.
    pub log: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cached_reports: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
