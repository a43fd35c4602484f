//! Node types for the file tree.

use std::fmt;
use std::str::FromStr;

use crate::{Result, VaultError};

use super::MAX_NAME_LENGTH;

/// Identity of the user owning a node.
///
/// Every store accessor takes one of these; there is no unscoped lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Wrap a user id.
    pub const fn new(user_id: i64) -> Self {
        Self(user_id)
    }

    /// The underlying user id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for OwnerId {
    fn from(user_id: i64) -> Self {
        Self(user_id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node variant. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Leaf carrying content.
    File,
    /// Container of other nodes.
    Folder,
}

impl NodeKind {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "file" => Ok(NodeKind::File),
            "folder" => Ok(NodeKind::Folder),
            _ => Err(format!("unknown node kind: {s}")),
        }
    }
}

impl TryFrom<String> for NodeKind {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// A file or folder in a user's tree.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Node {
    /// Store-generated id (UUID v4).
    pub id: String,
    /// Display name. For files this includes the extension.
    pub name: String,
    /// File or folder.
    #[sqlx(try_from = "String")]
    pub kind: NodeKind,
    /// Parent folder, `None` at root level.
    pub parent_id: Option<String>,
    /// Owning user.
    #[sqlx(try_from = "i64")]
    pub owner_id: OwnerId,
    /// File content. Always `None` for folders.
    pub data: Option<Vec<u8>>,
    /// Byte length of `data`. Always `None` for folders.
    pub size: Option<i64>,
    /// Creation timestamp (UTC, `YYYY-MM-DD HH:MM:SS`).
    pub created_at: String,
}

impl Node {
    /// Whether this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Whether this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// A node's id and kind, without its content.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NodeRef {
    pub id: String,
    #[sqlx(try_from = "String")]
    pub kind: NodeKind,
}

impl NodeRef {
    /// Whether this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

impl From<&Node> for NodeRef {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind,
        }
    }
}

/// Data for creating a node.
#[derive(Debug, Clone)]
pub struct NewNode {
    /// Display name.
    pub name: String,
    /// File or folder.
    pub kind: NodeKind,
    /// Parent folder id.
    pub parent_id: Option<String>,
    /// Owning user.
    pub owner_id: OwnerId,
    /// Content (files only).
    pub data: Option<Vec<u8>>,
}

impl NewNode {
    /// A folder named `name` under `parent_id`.
    pub fn folder(name: impl Into<String>, parent_id: Option<String>, owner_id: OwnerId) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Folder,
            parent_id,
            owner_id,
            data: None,
        }
    }

    /// A file named `name` holding `data` under `parent_id`.
    pub fn file(
        name: impl Into<String>,
        data: Vec<u8>,
        parent_id: Option<String>,
        owner_id: OwnerId,
    ) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            parent_id,
            owner_id,
            data: Some(data),
        }
    }

    /// Byte length of the content, `None` for folders.
    pub fn size(&self) -> Option<i64> {
        self.data.as_ref().map(|d| d.len() as i64)
    }
}

/// Patch applied by `NodeStore::update`.
///
/// Only the name is mutable; kind, owner and parent are fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    /// New display name.
    pub name: Option<String>,
}

impl NodeUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// Validate and normalize a node name.
///
/// Returns the trimmed name. Rejects empty names, names longer than
/// `MAX_NAME_LENGTH` characters, control characters, path separators and
/// the `.`/`..` path components.
pub fn validate_node_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VaultError::Validation("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(VaultError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(VaultError::Validation(
            "name must not contain control characters".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(VaultError::Validation(
            "name must not contain '/' or '\\'".to_string(),
        ));
    }
    if name == "." || name == ".." {
        return Err(VaultError::Validation(format!("'{name}' is not a valid name")));
    }
    Ok(name.to_string())
}
