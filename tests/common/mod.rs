//! Test helpers for Web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use serde_json::{json, Value};

use treevault::web::handlers::AppState;
use treevault::web::middleware::JwtState;
use treevault::web::{create_health_router, create_router};
use treevault::Database;

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";
pub const PASSWORD: &str = "password123";

/// Create a test server over an in-memory database.
pub async fn create_test_server() -> TestServer {
    create_test_server_with_limit(10 * 1024 * 1024).await
}

/// Create a test server with a custom request body limit.
pub async fn create_test_server_with_limit(max_body_bytes: usize) -> TestServer {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let app_state = Arc::new(AppState::new(Arc::new(db), JWT_SECRET, 900));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));

    let router = create_router(app_state, jwt_state, &[], max_body_bytes)
        .merge(create_health_router());

    TestServer::new(router).expect("Failed to create test server")
}

/// Register `username` and return its access token.
pub async fn register_and_login(server: &TestServer, username: &str) -> String {
    server
        .post("/api/auth/register")
        .json(&json!({ "username": username, "password": PASSWORD }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let body: Value = server
        .post("/api/auth/login")
        .json(&json!({ "username": username, "password": PASSWORD }))
        .await
        .json();

    body["data"]["access_token"]
        .as_str()
        .expect("login returned no token")
        .to_string()
}

/// `Authorization` header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Create a folder and return its id.
pub async fn create_folder(
    server: &TestServer,
    token: &str,
    name: &str,
    parent_id: Option<&str>,
) -> String {
    let body: Value = server
        .post("/api/folder")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&json!({ "name": name, "parent_id": parent_id }))
        .await
        .json();

    body["data"]["id"].as_str().expect("no folder id").to_string()
}
