//! Leaf resource store contract.

use async_trait::async_trait;

use canopy_core::result::AppResult;
use canopy_core::types::{LeafId, NodeId};
use canopy_entity::leaf::LeafResource;

/// Lookup and removal of leaf resources attached to containers.
#[async_trait]
pub trait LeafStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a leaf by ID.
    async fn get(&self, id: LeafId) -> AppResult<Option<LeafResource>>;

    /// Leaves attached directly to a container, ordered by name.
    async fn leaves_in(&self, container_id: NodeId) -> AppResult<Vec<LeafResource>>;

    /// Attach a leaf.
    async fn attach(&self, leaf: LeafResource) -> AppResult<LeafResource>;

    /// Remove a leaf. Returns `false` if it was already absent.
    async fn delete(&self, id: LeafId) -> AppResult<bool>;
}
