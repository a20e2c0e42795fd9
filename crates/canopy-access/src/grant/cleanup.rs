//! Removes grants whose resource has been deleted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use canopy_core::result::AppResult;
use canopy_entity::grant::ResourceRef;
use canopy_entity::leaf::LeafResource;
use canopy_entity::node::Node;
use canopy_store::{GrantFilter, GrantStore};
use canopy_tree::DeleteHook;

/// Delete hook that drops every grant on a removed node or leaf.
///
/// Inherited access needs no extra work: once the ancestor's rows are gone
/// nothing beneath it can inherit from them.
#[derive(Debug, Clone)]
pub struct GrantCleanup {
    grants: Arc<dyn GrantStore>,
}

impl GrantCleanup {
    /// Creates a cleanup hook over the grant store.
    pub fn new(grants: Arc<dyn GrantStore>) -> Self {
        Self { grants }
    }

    async fn purge(&self, resource: ResourceRef) -> AppResult<()> {
        let removed = self.grants.remove_all(&GrantFilter::on(resource)).await?;
        if removed > 0 {
            debug!(resource = %resource, removed, "Removed grants on deleted resource");
        }
        Ok(())
    }
}

#[async_trait]
impl DeleteHook for GrantCleanup {
    async fn leaf_deleted(&self, leaf: &LeafResource) -> AppResult<()> {
        self.purge(ResourceRef::leaf(leaf.id)).await
    }

    async fn node_deleted(&self, node: &Node) -> AppResult<()> {
        self.purge(ResourceRef::container(node.id)).await
    }
}
