//! Rename policy.
//!
//! Folders take the requested name as is. Files keep their extension: any
//! extension in the requested name is dropped and the current one is put
//! back, so a rename never changes a file's type.

use tracing::info;

use super::node::{validate_node_name, Node, NodeKind, NodeUpdate, OwnerId};
use super::store::NodeStore;
use crate::{Result, VaultError};

/// Split `name` into stem and extension at the last `.`.
///
/// A leading dot (`.env`) or a trailing dot (`notes.`) does not start an
/// extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => (&name[..i], Some(&name[i + 1..])),
        _ => (name, None),
    }
}

/// The name a node of `kind` currently called `current` gets when renamed
/// to `requested`.
pub fn renamed_name(kind: NodeKind, current: &str, requested: &str) -> String {
    match kind {
        NodeKind::Folder => requested.to_string(),
        NodeKind::File => {
            let (stem, _) = split_extension(requested);
            match split_extension(current) {
                (_, Some(ext)) => format!("{stem}.{ext}"),
                (_, None) => stem.to_string(),
            }
        }
    }
}

/// Rename node `id` for `owner` following the extension policy.
pub async fn rename<S>(store: &S, id: &str, owner: OwnerId, new_name: &str) -> Result<Node>
where
    S: NodeStore + ?Sized,
{
    let requested = validate_node_name(new_name)?;

    let node = store
        .find_by_id(id, owner)
        .await?
        .ok_or_else(|| VaultError::NotFound("node".to_string()))?;

    let name = validate_node_name(&renamed_name(node.kind, &node.name, &requested))?;

    let updated = store
        .update(id, owner, &NodeUpdate::new().name(name.as_str()))
        .await?
        .ok_or_else(|| VaultError::NotFound("node".to_string()))?;

    info!(owner = %owner, node = %id, from = %node.name, to = %updated.name, "Renamed node");
    Ok(updated)
}
