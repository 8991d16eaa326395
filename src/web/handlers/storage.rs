//! Upload batch and file handlers.
//!
//! These routes are unauthenticated; uploads come from devices that only
//! know the batch name.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::datetime::http_date;
use crate::storage::StoredFile;
use crate::web::dto::{
    ApiResponse, BatchListResponse, BatchResponse, FileListResponse, FileQuery,
    RenameBatchRequest, UploadResponse,
};
use crate::web::error::ApiError;

/// Multipart field carrying uploaded files.
const UPLOAD_FIELD: &str = "files";

/// POST /api/directory - Create a batch named after the current time.
pub async fn create_batch(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse<BatchResponse>>), ApiError> {
    let directory = state.store.create_batch(chrono::Local::now())?;
    tracing::info!(directory = %directory, "Batch created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(BatchResponse { directory })),
    ))
}

/// GET /api/directory - List batches, newest first.
pub async fn list_batches(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<BatchListResponse>>, ApiError> {
    let directories = state.store.list_batches()?;
    Ok(Json(ApiResponse::new(BatchListResponse { directories })))
}

/// POST /api/directory/rename - Rename a batch.
pub async fn rename_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenameBatchRequest>,
) -> Result<Json<ApiResponse<BatchResponse>>, ApiError> {
    state.store.rename_batch(&req.old_name, &req.new_name)?;
    tracing::info!(from = %req.old_name, to = %req.new_name, "Batch renamed");

    Ok(Json(ApiResponse::new(BatchResponse {
        directory: req.new_name,
    })))
}

/// GET /api/directory/:directory - List files in a batch.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(directory): Path<String>,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let files = state.store.list_files(&directory)?;
    Ok(Json(ApiResponse::new(FileListResponse { files })))
}

/// DELETE /api/directory/:directory - Delete a batch and its files.
pub async fn delete_batch(
    State(state): State<Arc<AppState>>,
    Path(directory): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.delete_batch(&directory)?;
    tracing::info!(directory = %directory, "Batch deleted");
    Ok(Json(ApiResponse::new(())))
}

/// POST /api/upload/:directory - Store every `files` part of a multipart body.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    Path(directory): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::bad_request("File part is missing a file name"))?;
        let content = field.bytes().await?;

        let stored = state.store.save_file(&directory, &original_name, &content)?;
        tracing::info!(directory = %directory, file = %stored, size = content.len(), "File uploaded");
        files.push(stored);
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }

    Ok(Json(ApiResponse::new(UploadResponse { directory, files })))
}

/// DELETE /api/file/:directory/:filename - Delete one file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path((directory, filename)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.delete_file(&directory, &filename)?;
    tracing::info!(directory = %directory, file = %filename, "File deleted");
    Ok(Json(ApiResponse::new(())))
}

/// GET /api/file?directory=&filename= - Download a file as an attachment.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let file = state.store.read_file(&query.directory, &query.filename)?;

    file_response(&file)
        .header(header::CONTENT_DISPOSITION, content_disposition_header(&file.name))
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .header(header::PRAGMA, "no-cache")
        .header(header::EXPIRES, "0")
        .body(Body::from(file.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /api/storage/:directory/:filename - Serve a file inline.
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path((directory, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let file = state.store.read_file(&directory, &filename)?;

    file_response(&file)
        .body(Body::from(file.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// Start a response carrying the file's type, length and modification time.
fn file_response(file: &StoredFile) -> axum::http::response::Builder {
    let mime = mime_guess::from_path(&file.name).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, file.content.len())
        .header(header::LAST_MODIFIED, http_date(file.modified))
}

/// Generate a Content-Disposition header value for a download.
///
/// Non-ASCII names get an ASCII fallback plus an RFC 5987 `filename*`.
fn content_disposition_header(filename: &str) -> String {
    let needs_escaping = filename
        .chars()
        .any(|c| !c.is_ascii() || c.is_control() || c == '"' || c == '\\');
    if !needs_escaping {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition_header("a.jpg"),
            "attachment; filename=\"a.jpg\""
        );
    }

    #[test]
    fn test_content_disposition_unicode() {
        let header = content_disposition_header("写真.jpg");
        assert!(header.starts_with("attachment; filename=\"__.jpg\""));
        assert!(header.contains("filename*=UTF-8''%E5%86%99%E7%9C%9F.jpg"));
    }

    #[test]
    fn test_content_disposition_quotes() {
        let header = content_disposition_header("say \"hi\".png");
        assert!(header.starts_with("attachment; filename=\"say _hi_.png\""));
        assert!(header.contains("filename*=UTF-8''say%20%22hi%22.png"));
    }

    #[test]
    fn test_file_response_headers() {
        let file = StoredFile {
            name: "photo.png".to_string(),
            content: vec![0u8; 4],
            modified: SystemTime::UNIX_EPOCH,
        };
        let response = file_response(&file).body(Body::empty()).unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");
        assert_eq!(
            response.headers()[header::LAST_MODIFIED],
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }
}
