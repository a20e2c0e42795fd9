//! In-memory leaf resource store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use canopy_core::result::AppResult;
use canopy_core::types::{LeafId, NodeId};
use canopy_entity::leaf::LeafResource;

use crate::traits::leaf::LeafStore;

/// Leaf store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeafStore {
    rows: Arc<DashMap<LeafId, LeafResource>>,
}

impl MemoryLeafStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored leaves.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl LeafStore for MemoryLeafStore {
    async fn get(&self, id: LeafId) -> AppResult<Option<LeafResource>> {
        Ok(self.rows.get(&id).map(|entry| entry.value().clone()))
    }

    async fn leaves_in(&self, container_id: NodeId) -> AppResult<Vec<LeafResource>> {
        let mut leaves: Vec<LeafResource> = self
            .rows
            .iter()
            .filter(|entry| entry.value().container_id == container_id)
            .map(|entry| entry.value().clone())
            .collect();
        leaves.sort_by_key(|leaf| (leaf.name.to_lowercase(), leaf.id));
        Ok(leaves)
    }

    async fn attach(&self, leaf: LeafResource) -> AppResult<LeafResource> {
        self.rows.insert(leaf.id, leaf.clone());
        Ok(leaf)
    }

    async fn delete(&self, id: LeafId) -> AppResult<bool> {
        Ok(self.rows.remove(&id).is_some())
    }
}
