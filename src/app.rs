//! Wiring of stores, engine, view, and resolver.

use std::sync::Arc;

use tracing::info;

use canopy_access::{AccessResolver, GrantCleanup, GrantService};
use canopy_core::config::CanopyConfig;
use canopy_core::error::AppError;
use canopy_core::events::EventPublisher;
use canopy_core::result::AppResult;
use canopy_core::types::NodeId;
use canopy_entity::leaf::LeafResource;
use canopy_store::{
    GrantStore, LeafStore, MemoryGrantStore, MemoryLeafStore, MemoryNodeStore, NodeStore,
};
use canopy_tree::{MutationEngine, TreeView};

/// The assembled tree and permission core.
///
/// Every component shares the same stores and event channel. Deleting a
/// node through [`Canopy::engine`] removes the grants on it via
/// [`GrantCleanup`].
#[derive(Debug, Clone)]
pub struct Canopy {
    /// Loaded configuration.
    config: CanopyConfig,
    /// Structural mutations.
    engine: MutationEngine,
    /// Tree rendering and export.
    view: TreeView,
    /// Effective access queries.
    resolver: AccessResolver,
    /// Grant management.
    grants: GrantService,
    /// Leaf attachments.
    leaves: Arc<dyn LeafStore>,
    /// Domain events.
    events: EventPublisher,
}

impl Canopy {
    /// Builds the core over in-memory stores.
    pub fn in_memory(config: CanopyConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(MemoryNodeStore::new()),
            Arc::new(MemoryLeafStore::new()),
            Arc::new(MemoryGrantStore::new()),
        )
    }

    /// Builds the core over caller-supplied stores.
    pub fn with_stores(
        config: CanopyConfig,
        nodes: Arc<dyn NodeStore>,
        leaves: Arc<dyn LeafStore>,
        grants: Arc<dyn GrantStore>,
    ) -> Self {
        let events = EventPublisher::new(config.tree.events_capacity);

        let engine = MutationEngine::new(
            Arc::clone(&nodes),
            Arc::clone(&leaves),
            events.clone(),
            config.tree.clone(),
        )
        .with_hook(Arc::new(GrantCleanup::new(Arc::clone(&grants))));

        let view = TreeView::new(Arc::clone(&nodes), Arc::clone(&leaves));
        let resolver = AccessResolver::new(
            nodes,
            Arc::clone(&leaves),
            Arc::clone(&grants),
            config.access.clone(),
        );
        let grants = GrantService::new(grants, events.clone());

        info!(
            max_label_length = config.tree.max_label_length,
            strategy = ?config.access.strategy,
            honor_expiry = config.access.honor_expiry,
            "Canopy core assembled"
        );

        Self {
            config,
            engine,
            view,
            resolver,
            grants,
            leaves,
            events,
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &CanopyConfig {
        &self.config
    }

    /// Structural mutations and listings.
    pub fn engine(&self) -> &MutationEngine {
        &self.engine
    }

    /// Tree rendering and subtree export.
    pub fn view(&self) -> &TreeView {
        &self.view
    }

    /// Effective access queries.
    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    /// Grant management.
    pub fn grants(&self) -> &GrantService {
        &self.grants
    }

    /// Leaf store.
    pub fn leaves(&self) -> &Arc<dyn LeafStore> {
        &self.leaves
    }

    /// Domain event channel.
    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    /// Attaches a leaf resource to an existing node.
    pub async fn attach_leaf(
        &self,
        container_id: NodeId,
        name: &str,
    ) -> AppResult<LeafResource> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Leaf name cannot be empty"));
        }
        self.engine.get(container_id).await?;
        self.leaves
            .attach(LeafResource::new(container_id, name))
            .await
    }
}
