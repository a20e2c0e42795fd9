//! In-memory grant store using `dashmap`.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use canopy_core::result::AppResult;
use canopy_core::types::{GrantId, PrincipalId};
use canopy_entity::grant::{Grant, ResourceRef};

use crate::traits::grant::{GrantFilter, GrantStore};

/// Grant store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryGrantStore {
    rows: Arc<DashMap<GrantId, Grant>>,
}

impl MemoryGrantStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn collect(&self, keep: impl Fn(&Grant) -> bool) -> Vec<Grant> {
        let mut grants: Vec<Grant> = self
            .rows
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        grants.sort_by_key(|g| (g.created_at, g.id));
        grants
    }
}

#[async_trait]
impl GrantStore for MemoryGrantStore {
    async fn grants_on(&self, resource: &ResourceRef) -> AppResult<Vec<Grant>> {
        Ok(self.collect(|g| g.resource == *resource))
    }

    async fn grants_for(&self, principal_id: PrincipalId) -> AppResult<Vec<Grant>> {
        Ok(self.collect(|g| g.principal_id == principal_id))
    }

    async fn add(&self, grant: Grant) -> AppResult<Grant> {
        self.rows.insert(grant.id, grant.clone());
        Ok(grant)
    }

    async fn remove_all(&self, filter: &GrantFilter) -> AppResult<usize> {
        let mut removed = 0;
        self.rows.retain(|_, grant| {
            let hit = filter.matches(grant);
            if hit {
                removed += 1;
            }
            !hit
        });
        debug!(removed, "Removed grant rows");
        Ok(removed)
    }
}
