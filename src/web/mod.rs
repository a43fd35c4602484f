//! Web API module for treevault.
//!
//! JSON/multipart HTTP interface over the file tree, authenticated with
//! bearer JWTs.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
