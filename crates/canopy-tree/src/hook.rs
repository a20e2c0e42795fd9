//! Delete notifications for collaborators outside the tree.

use async_trait::async_trait;

use canopy_core::result::AppResult;
use canopy_entity::leaf::LeafResource;
use canopy_entity::node::Node;

/// Collaborator told about every node and leaf a delete removes.
///
/// The engine has no knowledge of what hooks do; grant cleanup is the
/// primary implementor. A hook error is logged and does not undo the delete.
#[async_trait]
pub trait DeleteHook: Send + Sync + std::fmt::Debug {
    /// A leaf resource was removed.
    async fn leaf_deleted(&self, leaf: &LeafResource) -> AppResult<()>;

    /// A node was removed.
    async fn node_deleted(&self, node: &Node) -> AppResult<()>;
}
