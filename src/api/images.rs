use axum::{
    body::Body,
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::images::ImageStore;

/// Serve a stored report image as raw bytes with a sniffed content type.
pub async fn get_image(
    Extension(images): Extension<ImageStore>,
    Path((report_id, filename)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    // Filenames are generated server-side; anything that looks like a
    // path component is not ours.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(AppError::NotFound("Image not found".to_string()));
    }

    let path = images.image_path(report_id, &filename);
    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Image not found".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, data.len().to_string()),
        ],
        Body::from(data),
    )
        .into_response())
}
