use crate::api::AppState;
use crate::errors::ApiError;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use dataprofile_core::ReportArtifact;
use std::sync::Arc;
use uuid::Uuid;

fn lookup(state: &AppState, id: Uuid) -> Result<Arc<ReportArtifact>, ApiError> {
    state
        .profiles
        .store()
        .get(&id)
        .ok_or(ApiError::ReportNotFound(id))
}

/// The report rendered inline.
pub async fn view_report(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let artifact = lookup(&state, path.into_inner())?;
    Ok(HttpResponse::Ok()
        .content_type(artifact.mime())
        .body(artifact.html.clone()))
}

/// The report as an attachment named `<base_name>_report.html`.
pub async fn download_report(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let artifact = lookup(&state, path.into_inner())?;
    Ok(HttpResponse::Ok()
        .content_type(artifact.mime())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(artifact.file_name.clone())],
        })
        .body(artifact.html.clone()))
}

pub async fn report_json(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let artifact = lookup(&state, path.into_inner())?;
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(artifact.json.clone()))
}
