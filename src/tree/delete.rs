//! Recursive deletion.
//!
//! The subtree is walked first and then removed deepest-first, so every
//! folder is deleted after its children. No transaction spans the walk: if
//! a store call fails partway, the nodes already removed stay removed, and
//! calling `delete_recursive` again on the same root finishes the job.

use tracing::{debug, info};

use super::node::{NodeRef, OwnerId};
use super::store::NodeStore;
use super::MAX_TREE_DEPTH;
use crate::{Result, VaultError};

/// Delete `id` and, for a folder, every descendant.
///
/// Returns the number of nodes removed. Fails with `NotFound` when the root
/// does not exist for `owner`. Descendants that disappear while the walk is
/// in progress are skipped.
pub async fn delete_recursive<S>(store: &S, id: &str, owner: OwnerId) -> Result<usize>
where
    S: NodeStore + ?Sized,
{
    let root = store
        .find_by_id(id, owner)
        .await?
        .ok_or_else(|| VaultError::NotFound("node".to_string()))?;

    // Pre-order list of the subtree; reversed it puts children before parents.
    let mut order = Vec::new();
    let mut stack = vec![(NodeRef::from(&root), 0usize)];

    while let Some((node, depth)) = stack.pop() {
        if node.is_folder() {
            if depth >= MAX_TREE_DEPTH {
                return Err(VaultError::Validation(format!(
                    "folder nesting exceeds {MAX_TREE_DEPTH} levels"
                )));
            }
            let children = store.find_child_refs(&node.id, owner).await?;
            stack.extend(children.into_iter().map(|c| (c, depth + 1)));
        }
        order.push(node.id);
    }

    let mut removed = 0;
    for node_id in order.iter().rev() {
        if store.delete(node_id, owner).await? {
            removed += 1;
        } else {
            debug!(owner = %owner, node = %node_id, "Node already gone");
        }
    }

    info!(owner = %owner, node = %id, removed, "Deleted subtree");
    Ok(removed)
}
