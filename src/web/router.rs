//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_batch, create_directory, create_user, delete_batch, delete_directory, delete_file,
    delete_user, download_file, list_batches, list_directories, list_files, list_users, login,
    me, register, rename_batch, serve_file, update_me, upload_files, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
    max_upload_bytes: usize,
) -> Router {
    // Upload batches (no authentication required)
    let batch_routes = Router::new()
        .route("/directory", post(create_batch).get(list_batches))
        .route("/directory/rename", post(rename_batch))
        .route("/directory/:directory", get(list_files).delete(delete_batch))
        .route(
            "/upload/:directory",
            post(upload_files).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/file", get(download_file))
        .route("/file/:directory/:filename", delete(delete_file))
        .route("/storage/:directory/:filename", get(serve_file));

    let user_routes = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me).put(update_me))
        .route("/", get(list_users).post(create_user))
        .route("/:id", delete(delete_user));

    let directory_routes = Router::new()
        .route("/", get(list_directories).post(create_directory))
        .route("/:id", delete(delete_directory));

    let api_routes = Router::new()
        .merge(batch_routes)
        .nest("/users", user_routes)
        .nest("/directories", directory_routes);

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
