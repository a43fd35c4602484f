//! Configuration module for treevault.
//!
//! Configuration is read once at startup and handed to the components that
//! need it (token issuer, database connector, web server).

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// JWT secret key (required).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_secs: u64,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    5000
}

fn default_jwt_expiry() -> u64 {
    3600 // 1 hour
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            jwt_secret: String::new(),
            jwt_expiry_secs: default_jwt_expiry(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/treevault.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Maximum request body size for uploads, in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_max_upload_size() -> u64 {
    50
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

impl FilesConfig {
    /// Body limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file. When unset, logs go to stdout only.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Upload configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TREEVAULT_JWT_SECRET`: JWT secret key
    /// - `TREEVAULT_DATABASE_PATH`: SQLite database path
    /// - `TREEVAULT_PORT`: listen port
    ///
    /// Empty values are ignored. A port that does not parse is an error.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(secret) = non_empty_env("TREEVAULT_JWT_SECRET") {
            self.web.jwt_secret = secret;
        }
        if let Some(path) = non_empty_env("TREEVAULT_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(port) = non_empty_env("TREEVAULT_PORT") {
            self.web.port = port
                .parse()
                .map_err(|_| VaultError::Config(format!("invalid TREEVAULT_PORT: {port}")))?;
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the JWT secret is missing or the port is zero.
    pub fn validate(&self) -> Result<()> {
        if self.web.jwt_secret.is_empty() {
            return Err(VaultError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via TREEVAULT_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.web.port == 0 {
            return Err(VaultError::Config("web.port must not be 0".to_string()));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
