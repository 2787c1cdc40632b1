use std::path::Path;

use actix_web::{get, web, HttpResponse};

use crate::errors::{ApiError, ApiResult};
use crate::services::upload_service::UploadService;

fn content_type_for(filename: &str) -> mime::Mime {
    match Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// GET /storage/{filename}
/// Read-only access to uploaded thumbnails.
#[get("/storage/{filename}")]
pub async fn serve_thumbnail(
    uploads: web::Data<UploadService>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let filename = path.into_inner();
    let not_found = || ApiError::NotFound("File not found".to_string());

    let file_path = uploads.resolve(&filename).ok_or_else(not_found)?;
    let data = tokio::fs::read(&file_path).await.map_err(|_| not_found())?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&filename))
        .body(data))
}
