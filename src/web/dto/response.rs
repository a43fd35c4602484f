//! Response DTOs for the Web API.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::db::User;
use crate::tree::Node;

/// Generic `{"data": ...}` wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Convert a stored `YYYY-MM-DD HH:MM:SS` UTC timestamp to RFC 3339.
///
/// Values that do not parse are passed through unchanged.
pub fn to_rfc3339(stored: &str) -> String {
    NaiveDateTime::parse_from_str(stored, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc().to_rfc3339())
        .unwrap_or_else(|_| stored.to_string())
}

/// A node as returned to clients. File content is never included.
#[derive(Debug, Serialize)]
pub struct NodeResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    pub created_at: String,
}

impl From<Node> for NodeResponse {
    fn from(node: Node) -> Self {
        Self {
            id: node.id,
            name: node.name,
            kind: node.kind.to_string(),
            parent_id: node.parent_id,
            size: node.size,
            created_at: to_rfc3339(&node.created_at),
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// User information (registration and `/api/auth/me`).
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: to_rfc3339(&user.created_at),
        }
    }
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
