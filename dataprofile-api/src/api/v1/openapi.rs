use crate::models::*;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::v1::profile::profile_endpoint,
        crate::api::v1::profile::report_json_endpoint,
        crate::api::monitoring::health
    ),
    components(schemas(UploadForm, ProfileResponse, HealthResponse, ErrorResponse)),
    tags(
        (name = "profile", description = "Dataset profiling operations"),
        (name = "monitoring", description = "Service health")
    ),
    info(
        title = "DataProfile API",
        version = "1.0.0",
        description = "Upload a CSV or JSON file and receive a profiling report",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;
