use std::path::Path as FsPath;

use axum::{
    body::Body,
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Path, Request, State,
    },
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB
pub const MEDIA_URL_PREFIX: &str = "/api/media";
const DEFAULT_EXTENSION: &str = "png";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
}

/// Lower-cased extension of the client's filename, if it is plain
/// alphanumeric.
fn extension_of(original: Option<&str>) -> String {
    original
        .and_then(|name| FsPath::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn is_safe_filename(filename: &str) -> bool {
    // Reject path traversal and special characters
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains('\0')
}

fn invalid_multipart(e: MultipartError) -> ApiError {
    tracing::warn!("Multipart error: {}", e);
    ApiError::InvalidInput("Invalid multipart data".to_string())
}

/// POST /api/media/upload - multipart field `file`, images only
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        if field.name() == Some("file") {
            return save_image(&state.config.media_root, field).await.map(Json);
        }
    }
    Err(ApiError::InvalidInput("No file provided".to_string()))
}

async fn save_image(root: &FsPath, field: Field<'_>) -> Result<UploadResponse, ApiError> {
    let is_image = field
        .content_type()
        .map(|kind| kind.starts_with("image/"))
        .unwrap_or(false);
    if !is_image {
        return Err(ApiError::InvalidInput(
            "Only image uploads are allowed".to_string(),
        ));
    }

    let extension = extension_of(field.file_name());
    let bytes = field.bytes().await.map_err(invalid_multipart)?;

    if bytes.is_empty() {
        return Err(ApiError::InvalidInput("Empty file".to_string()));
    }
    if bytes.len() > MAX_UPLOAD_SIZE {
        return Err(ApiError::InvalidInput(
            "File too large. Maximum size is 10MB.".to_string(),
        ));
    }

    tokio::fs::create_dir_all(root)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to create media directory: {e}")))?;

    let filename = format!("{}.{}", Uuid::new_v4().simple(), extension);
    tokio::fs::write(root.join(&filename), &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to save {filename}: {e}")))?;

    tracing::info!(filename = %filename, size = bytes.len(), "Media uploaded");
    Ok(UploadResponse {
        url: format!("{MEDIA_URL_PREFIX}/{filename}"),
        filename,
    })
}

/// GET /api/media/{filename}
pub async fn serve_media(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    req: Request,
) -> Result<Response, ApiError> {
    if !is_safe_filename(&filename) {
        return Err(ApiError::InvalidInput("Invalid filename".to_string()));
    }

    let path = state.config.media_root.join(&filename);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(ApiError::NotFound("File not found".to_string())),
    }

    let res = ServeFile::new(path)
        .oneshot(req)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read {filename}: {e}")))?;
    Ok(res.map(Body::new))
}
