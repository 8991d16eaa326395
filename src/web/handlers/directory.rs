//! Directory record handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::db::{DirectoryRepository, NewDirectoryRecord};
use crate::web::dto::{
    ApiResponse, CreateDirectoryRecordRequest, DirectoryRecordResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::CurrentUser;

/// GET /api/directories - Super admins see every record, users their own.
pub async fn list_directories(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<DirectoryRecordResponse>>>, ApiError> {
    let repo = DirectoryRepository::new(state.db.pool());
    let records = if user.is_super_admin() {
        repo.list_all().await?
    } else {
        repo.list_by_owner(user.id).await?
    };

    Ok(Json(ApiResponse::new(
        records.into_iter().map(DirectoryRecordResponse::from).collect(),
    )))
}

/// POST /api/directories - Register a directory owned by the caller.
pub async fn create_directory(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateDirectoryRecordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DirectoryRecordResponse>>), ApiError> {
    let repo = DirectoryRepository::new(state.db.pool());
    let record = repo
        .create(&NewDirectoryRecord::new(req.name.trim(), req.path, user.id))
        .await?;

    tracing::info!(user_id = user.id, record_id = record.id, path = %record.path, "Directory record created");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(record.into()))))
}

/// DELETE /api/directories/:id - Owner or super admin only.
pub async fn delete_directory(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let repo = DirectoryRepository::new(state.db.pool());
    let record = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Directory not found"))?;

    if !user.can_manage(record.user_id) {
        return Err(ApiError::forbidden("Not allowed to delete this directory"));
    }

    repo.delete(id).await?;
    tracing::info!(user_id = user.id, record_id = id, "Directory record deleted");
    Ok(Json(ApiResponse::new(())))
}
