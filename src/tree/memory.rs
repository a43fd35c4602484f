//! In-memory node store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::node::{NewNode, Node, NodeKind, NodeRef, NodeUpdate, OwnerId};
use super::store::{new_node_id, NodeStore};
use crate::{Result, VaultError};

/// `NodeStore` kept in a map, with the same referential rules as the
/// `nodes` table: a parent must exist for the same owner, and a node with
/// children cannot be deleted.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    nodes: Mutex<HashMap<String, Node>>,
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes across all owners.
    pub async fn len(&self) -> usize {
        self.nodes.lock().await.len()
    }

    /// Whether the store holds no nodes.
    pub async fn is_empty(&self) -> bool {
        self.nodes.lock().await.is_empty()
    }
}

fn sort_siblings(nodes: &mut [Node]) {
    nodes.sort_by(|a, b| {
        (a.kind == NodeKind::File, &a.name, &a.id).cmp(&(b.kind == NodeKind::File, &b.name, &b.id))
    });
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn create(&self, node: &NewNode) -> Result<String> {
        let mut nodes = self.nodes.lock().await;

        if let Some(ref parent_id) = node.parent_id {
            let parent_ok = nodes
                .get(parent_id)
                .is_some_and(|p| p.owner_id == node.owner_id);
            if !parent_ok {
                return Err(VaultError::Database(format!(
                    "parent {parent_id} does not exist"
                )));
            }
        }

        let id = new_node_id();
        nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                name: node.name.clone(),
                kind: node.kind,
                parent_id: node.parent_id.clone(),
                owner_id: node.owner_id,
                data: node.data.clone(),
                size: node.size(),
                created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            },
        );

        Ok(id)
    }

    async fn find_by_id(&self, id: &str, owner: OwnerId) -> Result<Option<Node>> {
        let nodes = self.nodes.lock().await;
        Ok(nodes.get(id).filter(|n| n.owner_id == owner).cloned())
    }

    async fn find_children(&self, parent_id: Option<&str>, owner: OwnerId) -> Result<Vec<Node>> {
        let nodes = self.nodes.lock().await;
        let mut children: Vec<Node> = nodes
            .values()
            .filter(|n| n.owner_id == owner && n.parent_id.as_deref() == parent_id)
            .cloned()
            .collect();
        sort_siblings(&mut children);
        Ok(children)
    }

    async fn find_child_refs(&self, parent_id: &str, owner: OwnerId) -> Result<Vec<NodeRef>> {
        let children = self.find_children(Some(parent_id), owner).await?;
        Ok(children.iter().map(NodeRef::from).collect())
    }

    async fn update(&self, id: &str, owner: OwnerId, update: &NodeUpdate) -> Result<Option<Node>> {
        let mut nodes = self.nodes.lock().await;
        let Some(node) = nodes.get_mut(id).filter(|n| n.owner_id == owner) else {
            return Ok(None);
        };

        if let Some(ref name) = update.name {
            node.name = name.clone();
        }

        Ok(Some(node.clone()))
    }

    async fn delete(&self, id: &str, owner: OwnerId) -> Result<bool> {
        let mut nodes = self.nodes.lock().await;
        if !nodes.get(id).is_some_and(|n| n.owner_id == owner) {
            return Ok(false);
        }
        if nodes.values().any(|n| n.parent_id.as_deref() == Some(id)) {
            return Err(VaultError::Database(format!("node {id} still has children")));
        }
        nodes.remove(id);
        Ok(true)
    }
}
