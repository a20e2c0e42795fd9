//! Node store contract.

use async_trait::async_trait;

use canopy_core::result::AppResult;
use canopy_core::types::{NamespaceId, NodeId};
use canopy_entity::node::Node;

/// Row versions a write expects to still be current at commit time.
///
/// The engine records the version of every node its pre-checks read (the
/// node being moved and each ancestor walked by the cycle check). A store
/// must reject the write with `ErrorKind::Conflict` if any of them changed
/// or disappeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionGuard {
    expected: Vec<(NodeId, u64)>,
}

impl VersionGuard {
    /// A guard with no preconditions.
    pub fn none() -> Self {
        Self::default()
    }

    /// A guard on a single node.
    pub fn on(node: &Node) -> Self {
        let mut guard = Self::default();
        guard.expect(node.id, node.version);
        guard
    }

    /// Require `id` to still be at `version`.
    pub fn expect(&mut self, id: NodeId, version: u64) {
        if !self.expected.iter().any(|(seen, _)| *seen == id) {
            self.expected.push((id, version));
        }
    }

    /// Iterate the expected `(id, version)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = &(NodeId, u64)> {
        self.expected.iter()
    }

    /// Number of guarded rows.
    pub fn len(&self) -> usize {
        self.expected.len()
    }

    /// Whether the guard carries no preconditions.
    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }
}

/// Record store for tree nodes.
#[async_trait]
pub trait NodeStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a node by ID.
    async fn get(&self, id: NodeId) -> AppResult<Option<Node>>;

    /// Direct children of a node, in display order.
    async fn children_of(&self, parent_id: NodeId) -> AppResult<Vec<Node>>;

    /// Parentless nodes of a namespace, in display order.
    async fn roots(&self, namespace: NamespaceId) -> AppResult<Vec<Node>>;

    /// Insert a node row as given.
    async fn insert(&self, node: Node) -> AppResult<NodeId>;

    /// Insert a parentless node only if its namespace has no root yet.
    ///
    /// The emptiness check and the write must be atomic; an existing root is
    /// reported as `ErrorKind::Conflict`.
    async fn insert_root(&self, node: Node) -> AppResult<NodeId>;

    /// Change a node's parent, checking `guard` atomically with the write.
    async fn set_parent(
        &self,
        id: NodeId,
        parent_id: Option<NodeId>,
        guard: &VersionGuard,
    ) -> AppResult<Node>;

    /// Change a node's label.
    async fn set_label(&self, id: NodeId, label: &str) -> AppResult<Node>;

    /// Delete a node row. Returns `false` if it was already absent.
    async fn delete(&self, id: NodeId) -> AppResult<bool>;
}
