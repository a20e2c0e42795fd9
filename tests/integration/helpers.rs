//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use canopy::{
    AppError, AppResult, Canopy, CanopyConfig, MutationEngine, NamespaceId, NewNode, Node,
    NodeId, NodeKind, NodeStore, VersionGuard,
};
use canopy_store::{MemoryGrantStore, MemoryLeafStore, MemoryNodeStore};

/// Node store wrapper with injectable faults and a delete log.
#[derive(Debug, Default)]
pub struct ScriptedNodeStore {
    /// The real rows.
    pub inner: MemoryNodeStore,
    /// Fail every `set_parent` with a storage error.
    pub fail_set_parent: AtomicBool,
    /// Fail `delete` once this many deletes have succeeded.
    pub fail_delete_after: AtomicUsize,
    /// Rename this node once, just before the next `set_parent` commits.
    pub interfere_with: Mutex<Option<NodeId>>,
    /// Every node id passed to a successful `delete`, in call order.
    pub delete_log: Mutex<Vec<NodeId>>,
}

impl ScriptedNodeStore {
    /// A wrapper with no faults armed.
    pub fn new() -> Self {
        Self {
            fail_delete_after: AtomicUsize::new(usize::MAX),
            ..Self::default()
        }
    }

    /// Ids deleted so far.
    pub fn deleted(&self) -> Vec<NodeId> {
        self.delete_log.lock().expect("delete log poisoned").clone()
    }
}

#[async_trait]
impl NodeStore for ScriptedNodeStore {
    async fn get(&self, id: NodeId) -> AppResult<Option<Node>> {
        self.inner.get(id).await
    }

    async fn children_of(&self, parent_id: NodeId) -> AppResult<Vec<Node>> {
        self.inner.children_of(parent_id).await
    }

    async fn roots(&self, namespace: NamespaceId) -> AppResult<Vec<Node>> {
        self.inner.roots(namespace).await
    }

    async fn insert(&self, node: Node) -> AppResult<NodeId> {
        self.inner.insert(node).await
    }

    async fn insert_root(&self, node: Node) -> AppResult<NodeId> {
        self.inner.insert_root(node).await
    }

    async fn set_parent(
        &self,
        id: NodeId,
        parent_id: Option<NodeId>,
        guard: &VersionGuard,
    ) -> AppResult<Node> {
        if self.fail_set_parent.load(Ordering::SeqCst) {
            return Err(AppError::storage("Injected set_parent failure"));
        }
        let interfere = self
            .interfere_with
            .lock()
            .expect("interfere slot poisoned")
            .take();
        if let Some(victim) = interfere {
            self.inner.set_label(victim, "touched concurrently").await?;
        }
        self.inner.set_parent(id, parent_id, guard).await
    }

    async fn set_label(&self, id: NodeId, label: &str) -> AppResult<Node> {
        self.inner.set_label(id, label).await
    }

    async fn delete(&self, id: NodeId) -> AppResult<bool> {
        let done = self.deleted().len();
        if done >= self.fail_delete_after.load(Ordering::SeqCst) {
            return Err(AppError::storage("Injected delete failure"));
        }
        let removed = self.inner.delete(id).await?;
        if removed {
            self.delete_log.lock().expect("delete log poisoned").push(id);
        }
        Ok(removed)
    }
}

/// A wired core over in-memory stores, with handles on every store.
pub struct TestCore {
    /// The assembled core.
    pub canopy: Canopy,
    /// The node store behind it.
    pub nodes: Arc<ScriptedNodeStore>,
    /// The leaf store behind it.
    pub leaves: MemoryLeafStore,
    /// The grant store behind it.
    pub grants: MemoryGrantStore,
    /// A fresh namespace for the test.
    pub ns: NamespaceId,
}

impl TestCore {
    /// Default configuration.
    pub fn new() -> Self {
        Self::with_config(CanopyConfig::default())
    }

    /// Custom configuration.
    pub fn with_config(config: CanopyConfig) -> Self {
        let nodes = Arc::new(ScriptedNodeStore::new());
        let leaves = MemoryLeafStore::new();
        let grants = MemoryGrantStore::new();
        let canopy = Canopy::with_stores(
            config,
            nodes.clone(),
            Arc::new(leaves.clone()),
            Arc::new(grants.clone()),
        );
        Self {
            canopy,
            nodes,
            leaves,
            grants,
            ns: NamespaceId::new(),
        }
    }

    /// The mutation engine.
    pub fn engine(&self) -> &MutationEngine {
        self.canopy.engine()
    }

    /// Creates a folder root in the test namespace.
    pub async fn root(&self, label: &str) -> NodeId {
        self.engine()
            .create(NewNode::root(self.ns, NodeKind::Container, label))
            .await
            .expect("Failed to create root")
            .id
    }

    /// Creates a folder under `parent`.
    pub async fn folder(&self, parent: NodeId, label: &str) -> NodeId {
        self.engine()
            .create(NewNode::child(self.ns, parent, NodeKind::Container, label))
            .await
            .expect("Failed to create folder")
            .id
    }

    /// Builds a complete tree of the given depth and fan-out under a new root.
    ///
    /// Returns every node with its depth, the root first.
    pub async fn build_tree(&self, depth: u32, fan_out: usize) -> Vec<(NodeId, u32)> {
        let root = self.root("root").await;
        let mut all = vec![(root, 0)];
        let mut frontier = vec![root];
        for level in 1..=depth {
            let mut next = Vec::new();
            for parent in &frontier {
                for i in 0..fan_out {
                    let id = self.folder(*parent, &format!("n{level}-{i}")).await;
                    next.push(id);
                    all.push((id, level));
                }
            }
            frontier = next;
        }
        all
    }

    /// Every stored node row, sorted by id.
    pub async fn snapshot(&self) -> Vec<Node> {
        self.nodes.inner.snapshot().await
    }
}

/// Looks up the depth recorded for each id.
pub fn depth_map(nodes: &[(NodeId, u32)]) -> HashMap<NodeId, u32> {
    nodes.iter().copied().collect()
}
