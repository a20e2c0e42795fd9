//! In-memory node store.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::{NamespaceId, NodeId};
use canopy_entity::node::Node;

use crate::traits::node::{NodeStore, VersionGuard};

#[derive(Debug, Default)]
struct Inner {
    nodes: HashMap<NodeId, Node>,
    children: HashMap<NodeId, BTreeSet<NodeId>>,
}

impl Inner {
    fn sorted(&self, ids: impl Iterator<Item = NodeId>) -> Vec<Node> {
        let mut nodes: Vec<Node> = ids.filter_map(|id| self.nodes.get(&id).cloned()).collect();
        nodes.sort_by_key(Node::sort_key);
        nodes
    }

    fn link(&mut self, parent: Option<NodeId>, child: NodeId) {
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().insert(child);
        }
    }

    fn unlink(&mut self, parent: Option<NodeId>, child: NodeId) {
        if let Some(parent) = parent {
            if let Some(set) = self.children.get_mut(&parent) {
                set.remove(&child);
                if set.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
    }

    fn check(&self, guard: &VersionGuard) -> AppResult<()> {
        for (id, expected) in guard.iter() {
            match self.nodes.get(id) {
                Some(node) if node.version == *expected => {}
                Some(node) => {
                    return Err(AppError::conflict(format!(
                        "Node {id} changed (expected version {expected}, found {})",
                        node.version
                    )));
                }
                None => {
                    return Err(AppError::conflict(format!(
                        "Node {id} disappeared before commit"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Node store held in process memory.
///
/// A single lock covers every row so that [`VersionGuard`] checks and the
/// guarded write are atomic. Deleting a node that still has live children
/// is refused, mirroring a relational store with a foreign key on
/// `parent_id`.
#[derive(Debug, Clone, Default)]
pub struct MemoryNodeStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    pub async fn len(&self) -> usize {
        self.inner.read().await.nodes.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.nodes.is_empty()
    }

    /// Snapshot of every row, sorted by id.
    pub async fn snapshot(&self) -> Vec<Node> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Node> = inner.nodes.values().cloned().collect();
        rows.sort_by_key(|n| n.id);
        rows
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn get(&self, id: NodeId) -> AppResult<Option<Node>> {
        Ok(self.inner.read().await.nodes.get(&id).cloned())
    }

    async fn children_of(&self, parent_id: NodeId) -> AppResult<Vec<Node>> {
        let inner = self.inner.read().await;
        let ids = inner
            .children
            .get(&parent_id)
            .map(|set| set.iter().copied().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(inner.sorted(ids.into_iter()))
    }

    async fn roots(&self, namespace: NamespaceId) -> AppResult<Vec<Node>> {
        let inner = self.inner.read().await;
        let ids: Vec<NodeId> = inner
            .nodes
            .values()
            .filter(|n| n.namespace == namespace && n.parent_id.is_none())
            .map(|n| n.id)
            .collect();
        Ok(inner.sorted(ids.into_iter()))
    }

    async fn insert(&self, node: Node) -> AppResult<NodeId> {
        let mut inner = self.inner.write().await;
        if inner.nodes.contains_key(&node.id) {
            return Err(AppError::conflict(format!("Node {} already exists", node.id)));
        }
        let id = node.id;
        inner.link(node.parent_id, id);
        inner.nodes.insert(id, node);
        debug!(node_id = %id, "Inserted node row");
        Ok(id)
    }

    async fn insert_root(&self, node: Node) -> AppResult<NodeId> {
        let mut inner = self.inner.write().await;
        let taken = inner
            .nodes
            .values()
            .any(|n| n.namespace == node.namespace && n.parent_id.is_none());
        if taken || node.parent_id.is_some() {
            return Err(AppError::conflict(format!(
                "Namespace {} already has a root",
                node.namespace
            )));
        }
        if inner.nodes.contains_key(&node.id) {
            return Err(AppError::conflict(format!("Node {} already exists", node.id)));
        }
        let id = node.id;
        inner.nodes.insert(id, node);
        debug!(node_id = %id, "Inserted root row");
        Ok(id)
    }

    async fn set_parent(
        &self,
        id: NodeId,
        parent_id: Option<NodeId>,
        guard: &VersionGuard,
    ) -> AppResult<Node> {
        let mut inner = self.inner.write().await;
        inner.check(guard)?;

        let old_parent = inner
            .nodes
            .get(&id)
            .map(|n| n.parent_id)
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;

        inner.unlink(old_parent, id);
        inner.link(parent_id, id);

        let node = inner
            .nodes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;
        node.parent_id = parent_id;
        node.version += 1;
        node.updated_at = Utc::now();
        Ok(node.clone())
    }

    async fn set_label(&self, id: NodeId, label: &str) -> AppResult<Node> {
        let mut inner = self.inner.write().await;
        let node = inner
            .nodes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Node {id} not found")))?;
        node.label = label.to_string();
        node.version += 1;
        node.updated_at = Utc::now();
        Ok(node.clone())
    }

    async fn delete(&self, id: NodeId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.children.get(&id).is_some_and(|set| !set.is_empty()) {
            return Err(AppError::storage(format!(
                "Foreign key violation: node {id} still has children"
            )));
        }
        match inner.nodes.remove(&id) {
            Some(node) => {
                inner.unlink(node.parent_id, id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
