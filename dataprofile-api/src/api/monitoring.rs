use crate::api::AppState;
use crate::models::HealthResponse;
use actix_web::{web, HttpResponse};
use chrono::Utc;

/// Liveness check with the number of reports held in memory.
#[utoipa::path(
    get,
    path = "/health",
    tag = "monitoring",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_reports: state.profiles.store().len(),
        timestamp: Utc::now(),
    })
}
