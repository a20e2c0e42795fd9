//! Structural mutations over a node store.
//!
//! Each operation runs its invariant checks against the store first and only
//! then issues writes. Multi-row operations either compensate on failure
//! (`insert_above`) or report exactly what was applied (`delete_cascade`).

mod delete;
mod structure;

use std::sync::Arc;

use tracing::debug;

use canopy_core::config::tree::TreeConfig;
use canopy_core::events::{DomainEvent, EventPayload, EventPublisher, NodeEvent};
use canopy_core::types::{NamespaceId, NodeId};
use canopy_entity::node::Node;
use canopy_store::{LeafStore, NodeStore};

use crate::algorithms::TreeWalker;
use crate::error::TreeError;
use crate::hook::DeleteHook;

pub use delete::DeleteReport;

/// Applies create, rename, move, splice, detach, and delete operations.
#[derive(Debug, Clone)]
pub struct MutationEngine {
    /// Node rows.
    nodes: Arc<dyn NodeStore>,
    /// Leaf resources attached to containers.
    leaves: Arc<dyn LeafStore>,
    /// Read-side traversals.
    walker: TreeWalker,
    /// Collaborators notified of deletes.
    hooks: Vec<Arc<dyn DeleteHook>>,
    /// Domain event publisher.
    events: EventPublisher,
    /// Engine settings.
    config: TreeConfig,
}

impl MutationEngine {
    /// Creates an engine over the given stores.
    pub fn new(
        nodes: Arc<dyn NodeStore>,
        leaves: Arc<dyn LeafStore>,
        events: EventPublisher,
        config: TreeConfig,
    ) -> Self {
        Self {
            walker: TreeWalker::new(Arc::clone(&nodes)),
            nodes,
            leaves,
            hooks: Vec::new(),
            events,
            config,
        }
    }

    /// Registers a collaborator notified of every removed node and leaf.
    pub fn with_hook(mut self, hook: Arc<dyn DeleteHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// The read-side walker sharing this engine's store.
    pub fn walker(&self) -> &TreeWalker {
        &self.walker
    }

    /// The event publisher.
    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    /// Gets a node by ID.
    pub async fn get(&self, id: NodeId) -> Result<Node, TreeError> {
        self.nodes.get(id).await?.ok_or(TreeError::NotFound(id))
    }

    /// Parentless nodes of a namespace, in display order.
    pub async fn roots(&self, namespace: NamespaceId) -> Result<Vec<Node>, TreeError> {
        Ok(self.nodes.roots(namespace).await?)
    }

    /// Direct children of a node, in display order.
    pub async fn children(&self, id: NodeId) -> Result<Vec<Node>, TreeError> {
        self.get(id).await?;
        Ok(self.nodes.children_of(id).await?)
    }

    /// The path from the root down to `id`.
    pub async fn breadcrumbs(&self, id: NodeId) -> Result<Vec<Node>, TreeError> {
        self.get(id).await?;
        Ok(self.walker.breadcrumbs(id).await?)
    }

    /// Trims and length-checks a display label.
    fn validate_label(&self, label: &str) -> Result<String, TreeError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(TreeError::Validation("Label cannot be empty".into()));
        }
        let len = trimmed.chars().count();
        if len > self.config.max_label_length {
            return Err(TreeError::Validation(format!(
                "Label is {len} characters, limit is {}",
                self.config.max_label_length
            )));
        }
        Ok(trimmed.to_string())
    }

    fn publish(&self, event: NodeEvent) {
        debug!(?event, "Publishing node event");
        self.events
            .publish(DomainEvent::new(None, EventPayload::Node(event)));
    }
}
