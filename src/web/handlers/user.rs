//! User management handlers (super admin only).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::auth;
use crate::db::UserRepository;
use crate::web::dto::{ApiResponse, CreateUserRequest, UserResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::SuperAdmin;
use crate::StationError;

/// GET /api/users - List all users.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    SuperAdmin(_admin): SuperAdmin,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let users = repo.list_all().await?;

    Ok(Json(ApiResponse::new(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// POST /api/users - Create a user with any role.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    SuperAdmin(admin): SuperAdmin,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = auth::register(&repo, &req.username, &req.password, req.role)
        .await
        .map_err(StationError::from)?;

    tracing::info!(admin_id = admin.id, user_id = user.id, role = %user.role, "Admin created user");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(user.into()))))
}

/// DELETE /api/users/:id - Delete a user.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    SuperAdmin(admin): SuperAdmin,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if id == admin.id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    let repo = UserRepository::new(state.db.pool());
    if !repo.delete(id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(admin_id = admin.id, user_id = id, "Admin deleted user");
    Ok(Json(ApiResponse::new(())))
}
