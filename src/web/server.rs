//! Web server for treevault.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::{Database, Result, VaultError};

use super::handlers::AppState;
use super::middleware::JwtState;
use super::router::{create_health_router, create_router};

/// HTTP server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: Vec<String>,
    max_body_bytes: usize,
}

impl WebServer {
    /// Create a server from configuration and an opened database.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let web = &config.web;
        let addr: SocketAddr = format!("{}:{}", web.host, web.port)
            .parse()
            .map_err(|e| VaultError::Config(format!("invalid web address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(
                Arc::new(db),
                &web.jwt_secret,
                web.jwt_expiry_secs,
            )),
            jwt_state: Arc::new(JwtState::new(&web.jwt_secret)),
            cors_origins: web.cors_origins.clone(),
            max_body_bytes: config.files.max_upload_bytes(),
        })
    }

    /// The configured bind address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the complete application router.
    pub fn router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            self.jwt_state.clone(),
            &self.cors_origins,
            self.max_body_bytes,
        )
        .merge(create_health_router())
    }

    /// Bind and serve until the process exits.
    pub async fn run(self) -> Result<()> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Bind, serve in the background and return the bound address.
    ///
    /// Binding to port 0 picks a free port.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Web server error");
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.web.host = "127.0.0.1".to_string();
        config.web.port = 0;
        config.web.jwt_secret = "test-secret-key".to_string();
        config
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let db = Database::open_in_memory().await.unwrap();
        let server = WebServer::new(&test_config(), db).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_invalid_host() {
        let mut config = test_config();
        config.web.host = "not a host".to_string();
        let db = Database::open_in_memory().await.unwrap();

        assert!(matches!(
            WebServer::new(&config, db),
            Err(VaultError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_web_server_run_with_addr() {
        let db = Database::open_in_memory().await.unwrap();
        let server = WebServer::new(&test_config(), db).unwrap();

        let addr = server.run_with_addr().await.unwrap();
        assert_ne!(addr.port(), 0);
    }
}
