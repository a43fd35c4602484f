//! Node persistence.
//!
//! `NodeStore` is the seam between the tree engine and storage. Every method
//! requires the caller's `OwnerId`; a node belonging to someone else is
//! indistinguishable from a missing one.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::node::{NewNode, Node, NodeRef, NodeUpdate, OwnerId};
use crate::{Result, VaultError};

/// Owner-scoped persistence for tree nodes.
///
/// `find_children` must return children in a stable order: folders first,
/// then by name, then by id.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Insert a node and return its generated id.
    async fn create(&self, node: &NewNode) -> Result<String>;

    /// Look up a node by id.
    async fn find_by_id(&self, id: &str, owner: OwnerId) -> Result<Option<Node>>;

    /// Direct children of `parent_id` (root level when `None`).
    async fn find_children(&self, parent_id: Option<&str>, owner: OwnerId) -> Result<Vec<Node>>;

    /// Ids and kinds of the direct children of `parent_id`, in the same
    /// order as `find_children` but without loading file content.
    async fn find_child_refs(&self, parent_id: &str, owner: OwnerId) -> Result<Vec<NodeRef>>;

    /// Apply `update` and return the updated node, `None` if not found.
    async fn update(&self, id: &str, owner: OwnerId, update: &NodeUpdate) -> Result<Option<Node>>;

    /// Delete a single node. Returns `false` if it was not found.
    async fn delete(&self, id: &str, owner: OwnerId) -> Result<bool>;
}

/// Generate a fresh node id.
pub(crate) fn new_node_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

const NODE_COLUMNS: &str = "id, name, kind, parent_id, owner_id, data, size, created_at";

/// SQLite-backed node store.
pub struct SqliteNodeStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SqliteNodeStore<'a> {
    /// Create a store over the given pool.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NodeStore for SqliteNodeStore<'_> {
    async fn create(&self, node: &NewNode) -> Result<String> {
        let id = new_node_id();

        sqlx::query(
            "INSERT INTO nodes (id, name, kind, parent_id, owner_id, data, size)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&node.name)
        .bind(node.kind.as_str())
        .bind(&node.parent_id)
        .bind(node.owner_id.get())
        .bind(&node.data)
        .bind(node.size())
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(id)
    }

    async fn find_by_id(&self, id: &str, owner: OwnerId) -> Result<Option<Node>> {
        let node = sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE id = ? AND owner_id = ?"
        ))
        .bind(id)
        .bind(owner.get())
        .fetch_optional(self.pool)
        .await?;

        Ok(node)
    }

    async fn find_children(&self, parent_id: Option<&str>, owner: OwnerId) -> Result<Vec<Node>> {
        // `IS` compares NULL parent ids as equal, covering the root level.
        let nodes = sqlx::query_as::<_, Node>(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes
             WHERE parent_id IS ? AND owner_id = ?
             ORDER BY kind = 'file', name, id"
        ))
        .bind(parent_id)
        .bind(owner.get())
        .fetch_all(self.pool)
        .await?;

        Ok(nodes)
    }

    async fn find_child_refs(&self, parent_id: &str, owner: OwnerId) -> Result<Vec<NodeRef>> {
        let refs = sqlx::query_as::<_, NodeRef>(
            "SELECT id, kind FROM nodes
             WHERE parent_id = ? AND owner_id = ?
             ORDER BY kind = 'file', name, id",
        )
        .bind(parent_id)
        .bind(owner.get())
        .fetch_all(self.pool)
        .await?;

        Ok(refs)
    }

    async fn update(&self, id: &str, owner: OwnerId, update: &NodeUpdate) -> Result<Option<Node>> {
        if let Some(ref name) = update.name {
            let result = sqlx::query("UPDATE nodes SET name = ? WHERE id = ? AND owner_id = ?")
                .bind(name)
                .bind(id)
                .bind(owner.get())
                .execute(self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Ok(None);
            }
        }

        self.find_by_id(id, owner).await
    }

    async fn delete(&self, id: &str, owner: OwnerId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner.get())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::tree::NodeKind;
    use crate::Database;

    async fn setup() -> (Database, OwnerId, OwnerId) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let u1 = repo.create(&NewUser::new("alice", "hash")).await.unwrap();
        let u2 = repo.create(&NewUser::new("bob", "hash")).await.unwrap();
        (db, OwnerId::new(u1.id), OwnerId::new(u2.id))
    }

    #[tokio::test]
    async fn test_create_and_find_file() {
        let (db, alice, _) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let id = store
            .create(&NewNode::file("a.txt", b"hello".to_vec(), None, alice))
            .await
            .unwrap();
        let node = store.find_by_id(&id, alice).await.unwrap().unwrap();

        assert_eq!(node.name, "a.txt");
        assert_eq!(node.kind, NodeKind::File);
        assert_eq!(node.data.as_deref(), Some(&b"hello"[..]));
        assert_eq!(node.size, Some(5));
        assert_eq!(node.owner_id, alice);
        assert!(node.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_folder_has_no_content() {
        let (db, alice, _) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let id = store.create(&NewNode::folder("docs", None, alice)).await.unwrap();
        let node = store.find_by_id(&id, alice).await.unwrap().unwrap();

        assert!(node.is_folder());
        assert!(node.data.is_none());
        assert!(node.size.is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique_uuids() {
        let (db, alice, _) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let a = store.create(&NewNode::folder("a", None, alice)).await.unwrap();
        let b = store.create(&NewNode::folder("a", None, alice)).await.unwrap();

        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let (db, alice, bob) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let folder = store.create(&NewNode::folder("private", None, alice)).await.unwrap();
        store
            .create(&NewNode::file("x.txt", vec![1], Some(folder.clone()), alice))
            .await
            .unwrap();

        assert!(store.find_by_id(&folder, bob).await.unwrap().is_none());
        assert!(store.find_children(None, bob).await.unwrap().is_empty());
        assert!(store.find_children(Some(&folder), bob).await.unwrap().is_empty());
        assert!(store
            .update(&folder, bob, &NodeUpdate::new().name("stolen"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(&folder, bob).await.unwrap());

        let still_there = store.find_by_id(&folder, alice).await.unwrap().unwrap();
        assert_eq!(still_there.name, "private");
    }

    #[tokio::test]
    async fn test_find_children_order() {
        let (db, alice, _) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        store.create(&NewNode::file("b.txt", vec![], None, alice)).await.unwrap();
        store.create(&NewNode::folder("zeta", None, alice)).await.unwrap();
        store.create(&NewNode::file("a.txt", vec![], None, alice)).await.unwrap();
        store.create(&NewNode::folder("alpha", None, alice)).await.unwrap();

        let names: Vec<String> = store
            .find_children(None, alice)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();

        assert_eq!(names, vec!["alpha", "zeta", "a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_find_children_of_folder() {
        let (db, alice, _) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let parent = store.create(&NewNode::folder("p", None, alice)).await.unwrap();
        store
            .create(&NewNode::file("in.txt", vec![], Some(parent.clone()), alice))
            .await
            .unwrap();
        store.create(&NewNode::file("out.txt", vec![], None, alice)).await.unwrap();

        let children = store.find_children(Some(&parent), alice).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "in.txt");
        assert_eq!(children[0].parent_id.as_deref(), Some(parent.as_str()));
    }

    #[tokio::test]
    async fn test_find_child_refs() {
        let (db, alice, bob) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let parent = store.create(&NewNode::folder("p", None, alice)).await.unwrap();
        let file = store
            .create(&NewNode::file("a.bin", vec![0; 64], Some(parent.clone()), alice))
            .await
            .unwrap();
        let sub = store
            .create(&NewNode::folder("z", Some(parent.clone()), alice))
            .await
            .unwrap();

        let refs = store.find_child_refs(&parent, alice).await.unwrap();
        assert_eq!(
            refs,
            vec![
                NodeRef { id: sub, kind: NodeKind::Folder },
                NodeRef { id: file, kind: NodeKind::File },
            ]
        );
        assert!(store.find_child_refs(&parent, bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, alice, _) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let id = store.create(&NewNode::folder("old", None, alice)).await.unwrap();
        let updated = store
            .update(&id, alice, &NodeUpdate::new().name("new"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "new");

        assert!(store.delete(&id, alice).await.unwrap());
        assert!(!store.delete(&id, alice).await.unwrap());
        assert!(store.find_by_id(&id, alice).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_parent_of_other_owner_rejected() {
        let (db, alice, bob) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let folder = store.create(&NewNode::folder("mine", None, alice)).await.unwrap();
        let result = store
            .create(&NewNode::folder("sneaky", Some(folder.clone()), bob))
            .await;

        assert!(matches!(result, Err(VaultError::Database(_))));
        assert!(store.find_children(Some(&folder), bob).await.unwrap().is_empty());
        assert!(store.delete(&folder, alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_dangling_parent_rejected() {
        let (db, alice, _) = setup().await;
        let store = SqliteNodeStore::new(db.pool());

        let result = store
            .create(&NewNode::folder("orphan", Some(new_node_id()), alice))
            .await;

        assert!(matches!(result, Err(VaultError::Database(_))));
    }
}
