use crate::api::upload::read_upload;
use crate::api::AppState;
use crate::errors::ApiError;
use crate::models::{ErrorResponse, ProfileResponse, UploadForm};
use crate::services::ProfileRun;
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use dataprofile_core::{to_split_json, PipelineOutcome, ProfileError};
use uuid::Uuid;

/// Profile an uploaded CSV or JSON file
///
/// Loads the file, profiles it and stores the HTML report. The response links to the
/// stored report and carries the console output captured while profiling, including
/// when profiling fails.
#[utoipa::path(
    post,
    path = "/api/v1/profile",
    tag = "profile",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Report generated", body = ProfileResponse),
        (status = 400, description = "Missing upload or unreadable file", body = ErrorResponse),
        (status = 415, description = "Unsupported file format", body = ErrorResponse),
        (status = 500, description = "Profiling failed", body = ProfileResponse)
    )
)]
#[post("/profile")]
pub async fn profile_endpoint(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(payload).await?;
    let run = state.profiles.clone().run_blocking(upload).await?;

    let response = to_response(run)?;
    if response.success {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::InternalServerError().json(response))
    }
}

fn to_response(run: ProfileRun) -> Result<ProfileResponse, ApiError> {
    let report_id = run.report_id;
    let preview = run
        .preview
        .as_ref()
        .map(to_split_json)
        .transpose()
        .map_err(ProfileError::from)?
        .unwrap_or(serde_json::Value::Null);

    match run.outcome {
        PipelineOutcome::Rejected { error, .. } => Err(error.into()),
        PipelineOutcome::Completed { table, generation } => Ok(ProfileResponse {
            success: report_id.is_some(),
            file_name: run.upload_name,
            report_file_name: generation.artifact().map(|a| a.file_name.clone()),
            report_id,
            report_url: report_id.map(|id| format!("/reports/{}", id)),
            download_url: report_id.map(|id| format!("/reports/{}/download", id)),
            rows: table.height(),
            columns: table.width(),
            preview,
            error: generation.error().map(|e| e.user_message()),
            log: generation.log,
        }),
    }
}

/// Report for `id` as JSON
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}/json",
    tag = "profile",
    params(("id" = Uuid, Path, description = "Report id returned by the profile endpoint")),
    responses(
        (status = 200, description = "Profile report as JSON"),
        (status = 404, description = "Unknown or evicted report", body = ErrorResponse)
    )
)]
#[actix_web::get("/reports/{id}/json")]
pub async fn report_json_endpoint(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    crate::api::reports::report_json(state, path).await
}
