//! Web API User Tests
//!
//! Integration tests for login, registration and user management.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use serde_json::{json, Value};

use common::{admin_token, bearer, create_test_app, login, register_user, user_token};
use imgstation::db::UserUpdate;
use imgstation::{Role, UserRepository};

// ============================================================================
// Registration & Login
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/users/register")
        .json(&json!({"username": "alice", "password": "password123"}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = create_test_app().await;
    register_user(&app.server, "alice", "password123").await;

    let response = app
        .server
        .post("/api/users/register")
        .json(&json!({"username": "ALICE", "password": "password123"}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation_error() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/users/register")
        .json(&json!({"username": "al", "password": "short"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["username"].is_array());
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn test_register_invalid_username_chars() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/users/register")
        .json(&json!({"username": "bad name", "password": "password123"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_invalid_json() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/users/register")
        .json(&json!({"username": "alice"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let app = create_test_app().await;
    register_user(&app.server, "alice", "password123").await;

    let response = app
        .server
        .post("/api/users/login")
        .json(&json!({"username": "alice", "password": "password123"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"]["token"].as_str().is_some());
    assert_eq!(body["data"]["expires_in"], 86400);
    assert_eq!(body["data"]["user"]["username"], "alice");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = create_test_app().await;
    register_user(&app.server, "alice", "password123").await;

    let response = app
        .server
        .post("/api/users/login")
        .json(&json!({"username": "alice", "password": "wrongpassword"}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/users/login")
        .json(&json!({"username": "nobody", "password": "password123"}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_empty_fields() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/users/login")
        .json(&json!({"username": "", "password": ""}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Current User
// ============================================================================

#[tokio::test]
async fn test_me() {
    let app = create_test_app().await;
    let token = user_token(&app, "alice").await;

    let response = app
        .server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn test_me_without_token() {
    let app = create_test_app().await;

    let response = app.server.get("/api/users/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_with_invalid_token() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer("not-a-jwt"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_after_user_deleted() {
    let app = create_test_app().await;
    let token = user_token(&app, "alice").await;

    let repo = UserRepository::new(app.db.pool());
    let user = repo.get_by_username("alice").await.unwrap().unwrap();
    repo.delete(user.id).await.unwrap();

    let response = app
        .server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_me_password() {
    let app = create_test_app().await;
    let token = user_token(&app, "alice").await;

    let response = app
        .server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"password": "newpassword456"}))
        .await;
    response.assert_status_ok();

    login(&app.server, "alice", "newpassword456").await;

    let response = app
        .server
        .post("/api/users/login")
        .json(&json!({"username": "alice", "password": "password123"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_me_short_password() {
    let app = create_test_app().await;
    let token = user_token(&app, "alice").await;

    let response = app
        .server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"password": "short"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_me_empty_body() {
    let app = create_test_app().await;
    let token = user_token(&app, "alice").await;

    let response = app
        .server
        .put("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "alice");
}

// ============================================================================
// User Management
// ============================================================================

#[tokio::test]
async fn test_list_users_as_admin() {
    let app = create_test_app().await;
    let token = admin_token(&app).await;
    register_user(&app.server, "alice", "password123").await;

    let response = app
        .server
        .get("/api/users")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "admin");
    assert_eq!(users[0]["role"], "super_admin");
}

#[tokio::test]
async fn test_list_users_forbidden_for_user() {
    let app = create_test_app().await;
    let token = user_token(&app, "alice").await;

    let response = app
        .server
        .get("/api/users")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_user_as_admin() {
    let app = create_test_app().await;
    let token = admin_token(&app).await;

    let response = app
        .server
        .post("/api/users")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "username": "second",
            "password": "password123",
            "role": "super_admin"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["role"], "super_admin");

    login(&app.server, "second", "password123").await;
}

#[tokio::test]
async fn test_create_user_forbidden_for_user() {
    let app = create_test_app().await;
    let token = user_token(&app, "alice").await;

    let response = app
        .server
        .post("/api/users")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({"username": "bob", "password": "password123"}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_user() {
    let app = create_test_app().await;
    let token = admin_token(&app).await;
    let body = register_user(&app.server, "alice", "password123").await;
    let alice_id = body["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .delete(&format!("/api/users/{}", alice_id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();

    let response = app
        .server
        .delete(&format!("/api/users/{}", alice_id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_self_not_allowed() {
    let app = create_test_app().await;
    let token = admin_token(&app).await;

    let me: Value = app
        .server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    let my_id = me["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .delete(&format!("/api/users/{}", my_id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_of_deleted_user_stays_invalid() {
    let app = create_test_app().await;
    let admin = admin_token(&app).await;
    let body = register_user(&app.server, "alice", "password123").await;
    let alice_id = body["data"]["id"].as_i64().unwrap();
    let alice = login(&app.server, "alice", "password123").await;

    app.server
        .delete(&format!("/api/users/{}", alice_id))
        .add_header(AUTHORIZATION, bearer(&admin))
        .await
        .assert_status_ok();

    // Same name, new account with a new ID
    register_user(&app.server, "alice", "password123").await;
    let response = app
        .server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&alice))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_is_read_from_database() {
    let app = create_test_app().await;
    let token = user_token(&app, "alice").await;

    let repo = UserRepository::new(app.db.pool());
    let alice = repo.get_by_username("alice").await.unwrap().unwrap();
    repo.update(alice.id, &UserUpdate::new().role(Role::SuperAdmin))
        .await
        .unwrap();

    // The token still claims "user", the stored role wins
    let response = app
        .server
        .get("/api/users")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
}
