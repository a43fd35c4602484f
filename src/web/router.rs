//! Router configuration for the Web API.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_folder, delete_node, download, list_files, login, me, register, rename_node,
    upload_file, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Create the `/api` router.
///
/// `max_body_bytes` caps every request body, multipart uploads included.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
    max_body_bytes: usize,
) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me));

    let tree_routes = Router::new()
        .route("/folder", post(create_folder))
        .route("/file", post(upload_file))
        .route("/file/:id", put(rename_node).delete(delete_node))
        .route("/files", get(list_files))
        .route("/download/:id", get(download));

    let api_routes = Router::new().nest("/auth", auth_routes).merge(tree_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(max_body_bytes))
                .layer(middleware::from_fn(move |req, next| {
                    jwt_auth(jwt_state.clone(), req, next)
                })),
        )
        .with_state(app_state)
}

/// Create the health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}
