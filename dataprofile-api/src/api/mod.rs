use crate::services::ProfileService;
use actix_web::{web, App, HttpResponse, HttpServer};
use dataprofile_core::config::UiConfig;
use dataprofile_core::AppConfig;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;

pub mod monitoring;
pub mod pages;
pub mod reports;
pub mod upload;
pub mod v1;

use self::v1::ApiDoc;

/// Shared by every worker.
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub ui: UiConfig,
}

impl AppState {
    pub fn new(profiles: ProfileService, ui: UiConfig) -> Self {
        Self {
            profiles: Arc::new(profiles),
            ui,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ProfileService::from_config(config), config.ui.clone())
    }
}

pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<
            tracing_actix_web::StreamSpan<actix_web::body::BoxBody>,
        >,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(TracingLogger::default())
        .app_data(state)
        .route("/", web::get().to(pages::index))
        .route("/profile", web::post().to(pages::profile_page))
        .service(
            web::scope("/reports")
                .route("/{id}", web::get().to(reports::view_report))
                .route("/{id}/download", web::get().to(reports::download_report)),
        )
        .service(
            web::scope("/api/v1")
                .service(v1::profile::profile_endpoint)
                .service(v1::profile::report_json_endpoint),
        )
        .route("/health", web::get().to(monitoring::health))
        .route("/api-docs/openapi.json", web::get().to(openapi_json))
}

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

pub async fn start_server(config: &AppConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_config(config));
    info!(
        "Starting {} on {}",
        config.ui.app_title, config.server.bind_address
    );

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }
    server.bind(&config.server.bind_address)?.run().await
}
