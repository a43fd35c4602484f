//! API handlers.

pub mod auth;
pub mod files;

pub use auth::*;
pub use files::*;
