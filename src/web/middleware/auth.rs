//! JWT authentication middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::tree::OwnerId;
use crate::web::error::ApiError;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: i64,
    pub username: String,
    /// Issued at (Unix seconds).
    pub iat: u64,
    /// Expiration (Unix seconds).
    pub exp: u64,
    /// Unique token id.
    pub jti: String,
}

/// Token verification settings, injected into request extensions.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

impl JwtState {
    /// Create verification state for an HS256 secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and verify a token.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, ApiError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                ApiError::unauthorized("Invalid or expired token")
            })
    }
}

/// Pull a bearer token from the `Authorization` header, falling back to a
/// `token` query parameter so plain browser links can download files.
fn extract_token(parts: &Parts) -> Option<String> {
    let header_token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    header_token.or_else(|| {
        parts.uri.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key == "token" && !value.is_empty() {
                urlencoding::decode(value).ok().map(|s| s.into_owned())
            } else {
                None
            }
        })
    })
}

/// Extractor for the authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

impl AuthUser {
    /// Owner identity used to scope every tree operation.
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.0.sub)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token =
            extract_token(parts).ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        let jwt_state = parts
            .extensions
            .get::<Arc<JwtState>>()
            .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

        jwt_state.verify(&token).map(AuthUser)
    }
}

/// Middleware injecting `JwtState` into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn claims(exp_offset: i64) -> JwtClaims {
        let now = chrono::Utc::now().timestamp();
        JwtClaims {
            sub: 42,
            username: "alice".to_string(),
            iat: now as u64,
            exp: (now + exp_offset) as u64,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    fn token(secret: &str, claims: &JwtClaims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn parts(uri: &str, auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_verify_valid_token() {
        let state = JwtState::new("test-secret");
        let decoded = state.verify(&token("test-secret", &claims(3600))).unwrap();

        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.username, "alice");
        assert_eq!(AuthUser(decoded).owner(), OwnerId::new(42));
    }

    #[test]
    fn test_expired_token_rejected() {
        let state = JwtState::new("test-secret");
        assert!(state.verify(&token("test-secret", &claims(-3600))).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let state = JwtState::new("secret2");
        assert!(state.verify(&token("secret1", &claims(3600))).is_err());
    }

    #[test]
    fn test_extract_token_sources() {
        assert_eq!(
            extract_token(&parts("/api/files", Some("Bearer abc"))).as_deref(),
            Some("abc")
        );
        assert_eq!(
            extract_token(&parts("/api/download/1?token=a%2Eb", None)).as_deref(),
            Some("a.b")
        );
        assert_eq!(
            extract_token(&parts("/api/download/1?x=1&token=q", Some("Basic zzz"))).as_deref(),
            Some("q")
        );
        assert!(extract_token(&parts("/api/files", None)).is_none());
        assert!(extract_token(&parts("/api/files?token=", None)).is_none());
    }
}
