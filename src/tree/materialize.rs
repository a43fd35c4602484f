//! Folder chain materialization for uploads carrying a relative path.

use tracing::debug;

use super::node::{validate_node_name, NewNode, NodeKind, OwnerId};
use super::store::NodeStore;
use super::MAX_TREE_DEPTH;
use crate::{Result, VaultError};

/// Fail unless a node at `depth` fits within `MAX_TREE_DEPTH`.
pub fn ensure_depth(depth: usize) -> Result<()> {
    if depth > MAX_TREE_DEPTH {
        return Err(VaultError::Validation(format!(
            "folder nesting exceeds {MAX_TREE_DEPTH} levels"
        )));
    }
    Ok(())
}

/// Depth of node `id` for `owner`, counting root-level nodes as 1.
///
/// `None` stands for the root itself and has depth 0.
pub async fn node_depth<S>(store: &S, id: Option<&str>, owner: OwnerId) -> Result<usize>
where
    S: NodeStore + ?Sized,
{
    let mut depth = 0;
    let mut current = id.map(str::to_string);

    while let Some(id) = current {
        depth += 1;
        ensure_depth(depth)?;
        let node = store
            .find_by_id(&id, owner)
            .await?
            .ok_or_else(|| VaultError::NotFound("node".to_string()))?;
        current = node.parent_id;
    }

    Ok(depth)
}

/// Split a slash-separated relative path into validated folder names.
///
/// Empty segments are dropped, so `"a//b/"` and `"/a/b"` both give
/// `["a", "b"]`.
pub fn path_segments(relative_path: &str) -> Result<Vec<String>> {
    let segments = relative_path
        .split('/')
        .filter(|s| !s.trim().is_empty())
        .map(validate_node_name)
        .collect::<Result<Vec<_>>>()?;

    if segments.len() > MAX_TREE_DEPTH {
        return Err(VaultError::Validation(format!(
            "path is deeper than {MAX_TREE_DEPTH} levels"
        )));
    }

    Ok(segments)
}

/// Ensure the folder chain named by `relative_path` exists below
/// `start_parent` and return the id of its last folder.
///
/// Existing folders with the exact name are reused, so repeating a call
/// creates nothing new. With an empty or absent path `start_parent` is
/// returned unchanged. Nothing is created when the last folder would sit
/// deeper than `MAX_TREE_DEPTH`.
pub async fn materialize<S>(
    store: &S,
    relative_path: Option<&str>,
    start_parent: Option<String>,
    owner: OwnerId,
) -> Result<Option<String>>
where
    S: NodeStore + ?Sized,
{
    let Some(relative_path) = relative_path else {
        return Ok(start_parent);
    };

    let segments = path_segments(relative_path)?;
    if segments.is_empty() {
        return Ok(start_parent);
    }
    let base = node_depth(store, start_parent.as_deref(), owner).await?;
    ensure_depth(base + segments.len())?;

    let mut current = start_parent;
    for segment in segments {
        let existing = store
            .find_children(current.as_deref(), owner)
            .await?
            .into_iter()
            .find(|n| n.kind == NodeKind::Folder && n.name == segment);

        current = Some(match existing {
            Some(folder) => folder.id,
            None => {
                let id = store
                    .create(&NewNode::folder(segment.as_str(), current.clone(), owner))
                    .await?;
                debug!(owner = %owner, node = %id, name = %segment, "Materialized folder");
                id
            }
        });
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MemoryNodeStore;

    const OWNER: OwnerId = OwnerId::new(1);

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("a/b").unwrap(), vec!["a", "b"]);
        assert_eq!(path_segments("/a//b/").unwrap(), vec!["a", "b"]);
        assert!(path_segments("").unwrap().is_empty());
        assert!(path_segments("a/../b").is_err());
        assert!(path_segments(&vec!["x"; MAX_TREE_DEPTH + 1].join("/")).is_err());
    }

    #[tokio::test]
    async fn test_node_depth() {
        let store = MemoryNodeStore::new();
        let c = materialize(&store, Some("a/b/c"), None, OWNER)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(node_depth(&store, None, OWNER).await.unwrap(), 0);
        assert_eq!(node_depth(&store, Some(&c), OWNER).await.unwrap(), 3);
        assert!(matches!(
            node_depth(&store, Some(&c), OwnerId::new(2)).await,
            Err(VaultError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_chain_past_depth_cap() {
        let store = MemoryNodeStore::new();
        let top = materialize(&store, Some("top"), None, OWNER).await.unwrap();
        let before = store.len().await;

        let too_deep = vec!["d"; MAX_TREE_DEPTH].join("/");
        let result = materialize(&store, Some(too_deep.as_str()), top.clone(), OWNER).await;
        assert!(matches!(result, Err(VaultError::Validation(_))));
        assert_eq!(store.len().await, before);

        let fits = vec!["d"; MAX_TREE_DEPTH - 1].join("/");
        let last = materialize(&store, Some(fits.as_str()), top, OWNER)
            .await
            .unwrap();
        assert_eq!(
            node_depth(&store, last.as_deref(), OWNER).await.unwrap(),
            MAX_TREE_DEPTH
        );
    }

    #[tokio::test]
    async fn test_no_path_returns_start_parent() {
        let store = MemoryNodeStore::new();

        let result = materialize(&store, None, Some("p".to_string()), OWNER).await.unwrap();
        assert_eq!(result.as_deref(), Some("p"));

        let result = materialize(&store, Some("//"), None, OWNER).await.unwrap();
        assert!(result.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_creates_chain() {
        let store = MemoryNodeStore::new();

        let c = materialize(&store, Some("a/b/c"), None, OWNER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.len().await, 3);

        let c_node = store.find_by_id(&c, OWNER).await.unwrap().unwrap();
        assert_eq!(c_node.name, "c");
        let b_node = store
            .find_by_id(c_node.parent_id.as_deref().unwrap(), OWNER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b_node.name, "b");
        let a_node = store
            .find_by_id(b_node.parent_id.as_deref().unwrap(), OWNER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a_node.name, "a");
        assert!(a_node.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_idempotent() {
        let store = MemoryNodeStore::new();

        let first = materialize(&store, Some("a/b"), None, OWNER).await.unwrap();
        let second = materialize(&store, Some("a/b/"), None, OWNER).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_file_with_same_name_is_not_reused() {
        let store = MemoryNodeStore::new();
        store.create(&NewNode::file("a", vec![1], None, OWNER)).await.unwrap();

        let id = materialize(&store, Some("a"), None, OWNER).await.unwrap().unwrap();
        let node = store.find_by_id(&id, OWNER).await.unwrap().unwrap();

        assert!(node.is_folder());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_other_owner_folders_are_not_reused() {
        let store = MemoryNodeStore::new();
        let theirs = materialize(&store, Some("shared"), None, OwnerId::new(2))
            .await
            .unwrap();
        let mine = materialize(&store, Some("shared"), None, OWNER).await.unwrap();

        assert_ne!(theirs, mine);
    }
}
