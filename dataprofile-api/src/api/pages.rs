use crate::api::upload::read_upload;
use crate::api::AppState;
use crate::errors::ApiError;
use crate::views;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

const HTML: &str = "text/html; charset=utf-8";

pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(HTML)
        .body(views::render_index(&state.ui))
}

/// Profile the posted file and render the page with preview, report and log.
pub async fn profile_page(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(payload).await?;
    let run = state.profiles.clone().run_blocking(upload).await?;

    Ok(HttpResponse::Ok()
        .content_type(HTML)
        .body(views::render_result(&state.ui, &run)))
}
