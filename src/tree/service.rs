//! Request-level tree operations.

use tracing::{debug, info};

use super::archive::{collect_leaves, ArchiveEntry};
use super::delete::delete_recursive;
use super::materialize::{ensure_depth, materialize, node_depth, path_segments};
use super::node::{validate_node_name, NewNode, Node, OwnerId};
use super::rename::rename;
use super::store::NodeStore;
use crate::{Result, VaultError};

/// A file upload as received from a client.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// Client-side filename. Only the last path component is used.
    pub filename: String,
    /// File bytes; `None` when no file part was sent.
    pub content: Option<Vec<u8>>,
    /// Folder to upload into (root level when absent).
    pub parent_id: Option<String>,
    /// Folder chain to create below the parent, e.g. `photos/2024`.
    pub relative_path: Option<String>,
}

/// Result of a download request.
#[derive(Debug, Clone)]
pub enum Download {
    /// A single file's bytes.
    File { name: String, content: Vec<u8> },
    /// A folder's files, to be packed as `name`.
    Archive {
        name: String,
        entries: Vec<ArchiveEntry>,
    },
}

/// Keep the last component of a client-supplied filename.
fn base_filename(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Tree operations for an authenticated owner.
pub struct TreeService<'a, S: NodeStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: NodeStore + ?Sized> TreeService<'a, S> {
    /// Create a service over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve an optional parent id to a folder owned by `owner`.
    async fn resolve_parent(
        &self,
        owner: OwnerId,
        parent_id: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(parent_id) = non_empty(parent_id) else {
            return Ok(None);
        };

        let parent = self
            .store
            .find_by_id(parent_id, owner)
            .await?
            .ok_or_else(|| VaultError::NotFound("parent folder".to_string()))?;

        if !parent.is_folder() {
            return Err(VaultError::Validation("parent must be a folder".to_string()));
        }

        Ok(Some(parent.id))
    }

    /// Fail unless `extra` more levels fit below `parent`.
    async fn ensure_room(&self, owner: OwnerId, parent: Option<&str>, extra: usize) -> Result<()> {
        let depth = node_depth(self.store, parent, owner).await?;
        ensure_depth(depth + extra)
    }

    async fn fetch(&self, owner: OwnerId, id: &str) -> Result<Node> {
        self.store
            .find_by_id(id, owner)
            .await?
            .ok_or_else(|| VaultError::NotFound("node".to_string()))
    }

    /// Create a folder.
    pub async fn create_folder(
        &self,
        owner: OwnerId,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Node> {
        let name = validate_node_name(name)?;
        let parent = self.resolve_parent(owner, parent_id).await?;
        self.ensure_room(owner, parent.as_deref(), 1).await?;

        let id = self
            .store
            .create(&NewNode::folder(name.as_str(), parent, owner))
            .await?;
        info!(owner = %owner, node = %id, name = %name, "Created folder");

        self.fetch(owner, &id).await
    }

    /// Store an uploaded file, creating folders from `relative_path` first.
    pub async fn upload_file(&self, owner: OwnerId, upload: UploadRequest) -> Result<Node> {
        let content = upload
            .content
            .ok_or_else(|| VaultError::Validation("No file uploaded".to_string()))?;
        let name = validate_node_name(base_filename(&upload.filename))?;

        let relative_path = non_empty(upload.relative_path.as_deref());
        let folders = match relative_path {
            Some(path) => path_segments(path)?.len(),
            None => 0,
        };

        let parent = self.resolve_parent(owner, upload.parent_id.as_deref()).await?;
        self.ensure_room(owner, parent.as_deref(), folders + 1).await?;
        let parent = materialize(self.store, relative_path, parent, owner).await?;

        let size = content.len();
        let id = self
            .store
            .create(&NewNode::file(name.as_str(), content, parent, owner))
            .await?;
        info!(owner = %owner, node = %id, name = %name, size, "Uploaded file");

        self.fetch(owner, &id).await
    }

    /// List the children of a folder, or the root level.
    pub async fn list(&self, owner: OwnerId, parent_id: Option<&str>) -> Result<Vec<Node>> {
        let parent = self.resolve_parent(owner, parent_id).await?;
        let nodes = self.store.find_children(parent.as_deref(), owner).await?;
        debug!(owner = %owner, count = nodes.len(), "Listed nodes");
        Ok(nodes)
    }

    /// Get a single node.
    pub async fn get(&self, owner: OwnerId, id: &str) -> Result<Node> {
        self.fetch(owner, id).await
    }

    /// Rename a node, keeping a file's extension.
    pub async fn rename(&self, owner: OwnerId, id: &str, new_name: &str) -> Result<Node> {
        rename(self.store, id, owner, new_name).await
    }

    /// Delete a node and its subtree. Returns the number of nodes removed.
    pub async fn delete(&self, owner: OwnerId, id: &str) -> Result<usize> {
        delete_recursive(self.store, id, owner).await
    }

    /// Prepare a download: file bytes, or the entries of a folder archive.
    pub async fn download(&self, owner: OwnerId, id: &str) -> Result<Download> {
        let node = self.fetch(owner, id).await?;

        if node.is_file() {
            return Ok(Download::File {
                name: node.name,
                content: node.data.unwrap_or_default(),
            });
        }

        let entries = collect_leaves(self.store, &node.id, owner, "").await?;
        debug!(owner = %owner, node = %id, files = entries.len(), "Collected archive entries");

        Ok(Download::Archive {
            name: format!("{}.zip", node.name),
            entries,
        })
    }
}
