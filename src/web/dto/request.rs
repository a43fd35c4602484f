//! Request DTOs for the Web API.
//!
//! Field names are snake_case; the camelCase spellings used by browser
//! clients (`parentId`, `relativePath`) are accepted as aliases.

use serde::Deserialize;
use validator::Validate;

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Folder creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder; root level when absent.
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<String>,
}

/// Rename request.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Query for `GET /api/files`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<String>,
}
