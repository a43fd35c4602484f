//! treevault - per-user file and folder storage over HTTP.
//!
//! Users register, log in and manage a tree of folders and files: upload
//! (optionally recreating a relative folder path), list, rename, delete a
//! whole subtree and download a file or a folder as a zip archive. Every
//! tree operation is scoped to the authenticated owner.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod tree;
pub mod web;

pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{Result, VaultError};
pub use tree::{Node, NodeKind, NodeStore, OwnerId, SqliteNodeStore, TreeService};
pub use web::WebServer;
