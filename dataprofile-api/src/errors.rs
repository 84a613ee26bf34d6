use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use dataprofile_core::{ErrorKind, ProfileError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unsupported file format")]
    UnsupportedFormat,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<ProfileError> for ApiError {
    fn from(error: ProfileError) -> Self {
        match error.kind() {
            ErrorKind::UnsupportedFormat => ApiError::UnsupportedFormat,
            ErrorKind::MalformedInput => ApiError::BadRequest(error.user_message()),
            ErrorKind::ProfilingFailure | ErrorKind::Internal => {
                ApiError::InternalError(error.to_string())
            }
        }
    }
}

impl From<actix_multipart::MultipartError> for ApiError {
    fn from(error: actix_multipart::MultipartError) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(error: actix_web::error::BlockingError) -> Self {
        ApiError::InternalError(error.to_string())
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ReportNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
