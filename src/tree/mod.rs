//! File tree engine for treevault.
//!
//! Users own a forest of folders and files linked by `parent_id`. This
//! module provides:
//! - Owner-scoped node persistence (`NodeStore`)
//! - Path materialization for folder uploads
//! - Recursive deletion
//! - Folder-to-zip packaging
//! - Extension-preserving rename
//!
//! `TreeService` combines these into the request-level operations used by
//! the web layer.

mod archive;
mod delete;
mod materialize;
mod memory;
mod node;
mod rename;
mod service;
mod store;

pub use archive::{build_zip, collect_leaves, sanitize_segment, ArchiveEntry};
pub use delete::delete_recursive;
pub use materialize::{ensure_depth, materialize, node_depth, path_segments};
pub use memory::MemoryNodeStore;
pub use node::{validate_node_name, NewNode, Node, NodeKind, NodeRef, NodeUpdate, OwnerId};
pub use rename::{rename, renamed_name, split_extension};
pub use service::{Download, TreeService, UploadRequest};
pub use store::{NodeStore, SqliteNodeStore};

/// Maximum length for a node name (in characters).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum nesting depth of a node. Root-level nodes are at depth 1.
pub const MAX_TREE_DEPTH: usize = 64;
