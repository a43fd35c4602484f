//! Error types for treevault.

use thiserror::Error;

/// Common error type for treevault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Database error.
    ///
    /// Wraps failures reported by the node or user store. Errors from sqlx
    /// are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found (or not owned by the caller).
    #[error("{0} not found")]
    NotFound(String),

    /// Username or similar unique value already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Zip packaging error.
    #[error("archive error: {0}")]
    Archive(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for VaultError {
    fn from(e: sqlx::Error) -> Self {
        VaultError::Database(e.to_string())
    }
}

impl From<zip::result::ZipError> for VaultError {
    fn from(e: zip::result::ZipError) -> Self {
        VaultError::Archive(e.to_string())
    }
}

/// Result type alias for treevault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
