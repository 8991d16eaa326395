//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::auth::{self, PasswordError};
use crate::db::{User, UserRepository, UserUpdate};
use crate::storage::UploadStore;
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, RegisterRequest, UpdateMeRequest, UserResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{CurrentUser, JwtClaims};
use crate::{Database, Role, StationError};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Record store.
    pub db: Arc<Database>,
    /// Upload batch storage.
    pub store: Arc<UploadStore>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub token_expiry: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Arc<Database>, store: Arc<UploadStore>, jwt_secret: &str, token_expiry: u64) -> Self {
        Self {
            db,
            store,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.to_string(),
            iat: now,
            exp: now + self.token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}

/// Map a rejected new password to an API error.
pub(crate) fn password_error(e: PasswordError) -> ApiError {
    match e {
        PasswordError::TooShort | PasswordError::TooLong => ApiError::unprocessable(e.to_string()),
        other => {
            tracing::error!("Failed to hash password: {}", other);
            ApiError::internal("Failed to update password")
        }
    }
}

/// POST /api/users/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_username(&req.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    auth::verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized("Invalid username or password"))?;

    let token = state.generate_access_token(&user)?;
    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(Json(ApiResponse::new(LoginResponse {
        token,
        expires_in: state.token_expiry,
        user: user.into(),
    })))
}

/// POST /api/users/register - Self-service registration.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = auth::register(&repo, &req.username, &req.password, Role::User)
        .await
        .map_err(StationError::from)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(user.into()))))
}

/// GET /api/users/me - Current user.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::new(user.into()))
}

/// PUT /api/users/me - Update the current user.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateMeRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let mut update = UserUpdate::new();
    if let Some(password) = req.password.as_deref() {
        update = update.password(auth::hash_password(password).map_err(password_error)?);
    }

    if update.is_empty() {
        return Ok(Json(ApiResponse::new(user.into())));
    }

    let repo = UserRepository::new(state.db.pool());
    let updated = repo
        .update(user.id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = updated.id, "User updated own account");
    Ok(Json(ApiResponse::new(updated.into())))
}
