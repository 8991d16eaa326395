//! Test helpers for Web API integration tests.
//!
//! Provides a fully wired application over an in-memory database and a
//! temporary storage root.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use imgstation::auth::ensure_super_admin;
use imgstation::web::WebServer;
use imgstation::{Config, Database, UploadStore, UserRepository};

/// JWT secret used by every test application.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// A running test application.
pub struct TestApp {
    /// HTTP test client.
    pub server: TestServer,
    /// Record store behind the API.
    pub db: Arc<Database>,
    /// Upload storage behind the API.
    pub store: Arc<UploadStore>,
    /// Keeps the storage root alive for the test's duration.
    pub temp: TempDir,
}

/// Create a test configuration.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config
}

/// Create a test application with the default test configuration.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_config(create_test_config()).await
}

/// Create a test application with a custom configuration.
pub async fn create_test_app_with_config(config: Config) -> TestApp {
    let temp = TempDir::new().expect("Failed to create temp dir");

    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );
    let store = Arc::new(
        UploadStore::new(temp.path().join("uploads")).expect("Failed to create upload store"),
    );

    let web = WebServer::new(&config, db.clone(), store.clone()).expect("Invalid test config");
    let server = TestServer::new(web.router()).expect("Failed to create test server");

    TestApp {
        server,
        db,
        store,
        temp,
    }
}

/// Register a user through the API and return the response body.
pub async fn register_user(server: &TestServer, username: &str, password: &str) -> Value {
    server
        .post("/api/users/register")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await
        .json::<Value>()
}

/// Log in and return the access token.
pub async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/api/users/login")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await;

    response.assert_status_ok();
    response.json::<Value>()["data"]["token"]
        .as_str()
        .expect("login response has no token")
        .to_string()
}

/// Register and log in a regular user, returning its token.
pub async fn user_token(app: &TestApp, username: &str) -> String {
    register_user(&app.server, username, "password123").await;
    login(&app.server, username, "password123").await
}

/// Bootstrap a super admin directly in the database and return its token.
pub async fn admin_token(app: &TestApp) -> String {
    let repo = UserRepository::new(app.db.pool());
    ensure_super_admin(&repo, "admin", "adminpass123")
        .await
        .expect("Failed to create super admin");
    login(&app.server, "admin", "adminpass123").await
}

/// Build an Authorization header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
