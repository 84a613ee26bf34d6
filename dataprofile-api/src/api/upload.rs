use crate::errors::ApiError;
use actix_multipart::Multipart;
use dataprofile_core::UploadedFile;
use futures::TryStreamExt;
use tracing::debug;

/// Form field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Read the `file` field of a multipart body into memory. Other fields are skipped.
pub async fn read_upload(mut payload: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(mut field) = payload.try_next().await? {
        let (name, file_name) = {
            let disposition = field.content_disposition();
            (
                disposition.get_name().map(str::to_owned),
                disposition.get_filename().map(str::to_owned),
            )
        };
        if name.as_deref() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = file_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::BadRequest("upload has no file name".to_string()))?;
        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            content.extend_from_slice(&chunk);
        }
        debug!("Received {} ({} bytes)", file_name, content.len());
        return Ok(UploadedFile::new(file_name, content));
    }

    Err(ApiError::BadRequest(format!(
        "missing '{}' field",
        UPLOAD_FIELD
    )))
}
