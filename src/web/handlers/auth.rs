//! Authentication handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::auth;
use crate::db::UserRepository;
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, RegisterRequest, UserInfo, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims};
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database (the sqlx pool inside is already shareable).
    pub db: Arc<Database>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token lifetime in seconds.
    pub access_token_expiry: u64,
}

impl AppState {
    /// Create the application state.
    pub fn new(db: Arc<Database>, jwt_secret: &str, access_token_expiry: u64) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry,
        }
    }

    /// Issue an access token for a user.
    pub fn generate_access_token(&self, user_id: i64, username: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to encode JWT");
            ApiError::internal("Failed to generate token")
        })
    }
}

/// POST /api/auth/register - Create an account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = auth::register(&repo, &req.username, &req.password).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(user.into()))))
}

/// POST /api/auth/login - Exchange credentials for an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = auth::authenticate(&repo, &req.username, &req.password).await?;

    let access_token = state.generate_access_token(user.id, &user.username)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(ApiResponse::new(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.access_token_expiry,
    })))
}

/// GET /api/auth/me - The authenticated user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    Ok(Json(ApiResponse::new(user.into())))
}
