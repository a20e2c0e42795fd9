//! Grant collection along the container ancestry.
//!
//! Inheritance rules:
//! - Grants stored on the resource itself always apply.
//! - A grant on an ancestor container applies only if its `inherit` flag is set.
//! - A leaf's ancestors start at the container it is attached to.
//! - The walk never leaves the resource's namespace.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use canopy_core::result::AppResult;
use canopy_core::types::{NodeId, PrincipalId};
use canopy_entity::grant::{Grant, ResourceKind, ResourceRef};
use canopy_store::LeafStore;
use canopy_tree::TreeWalker;

use super::checker::GrantChecker;

/// The applicable grants found at one level of the ancestry.
#[derive(Debug, Clone)]
pub struct GrantLayer {
    /// Where the grants are stored.
    pub resource: ResourceRef,
    /// Hops from the queried resource (0 for the resource itself).
    pub distance: u32,
    /// Applicable grants at this level. Never empty.
    pub grants: Vec<Grant>,
}

/// Collects direct and inherited grants for a resource.
#[derive(Debug, Clone)]
pub struct InheritanceWalker {
    /// Ancestry walks.
    walker: TreeWalker,
    /// Leaf-to-container lookups.
    leaves: Arc<dyn LeafStore>,
    /// Direct grant lookups.
    checker: GrantChecker,
}

impl InheritanceWalker {
    /// Creates a new inheritance walker.
    pub fn new(walker: TreeWalker, leaves: Arc<dyn LeafStore>, checker: GrantChecker) -> Self {
        Self {
            walker,
            leaves,
            checker,
        }
    }

    /// Applicable grants on `resource` and its ancestors, most specific first.
    ///
    /// Levels without an applicable grant are omitted. With `principal_id`
    /// set only that principal's grants are collected.
    pub async fn layers(
        &self,
        resource: ResourceRef,
        principal_id: Option<PrincipalId>,
    ) -> AppResult<Vec<GrantLayer>> {
        let now = Utc::now();
        let mut layers = Vec::new();

        let direct = self.checker.grants_on(&resource, principal_id, now).await?;
        if !direct.is_empty() {
            layers.push(GrantLayer {
                resource,
                distance: 0,
                grants: direct,
            });
        }

        let Some((container_id, skip, offset)) = self.first_container(&resource).await? else {
            return Ok(layers);
        };

        let ancestry = self.walker.ancestry(container_id).await?;
        for (index, ancestor) in ancestry.chain.iter().enumerate().skip(skip) {
            let at = ResourceRef::container(ancestor.id);
            let inherited = self.inherited_on(&at, principal_id, now).await?;
            if !inherited.is_empty() {
                layers.push(GrantLayer {
                    resource: at,
                    distance: index as u32 + offset,
                    grants: inherited,
                });
            }
        }

        Ok(layers)
    }

    /// The container whose ancestry supplies inherited grants.
    ///
    /// Returns the container, how many chain entries to skip (the container
    /// itself when it is the queried resource), and the distance offset.
    async fn first_container(
        &self,
        resource: &ResourceRef,
    ) -> AppResult<Option<(NodeId, usize, u32)>> {
        match resource.kind {
            ResourceKind::Container => Ok(resource.as_node().map(|id| (id, 1, 0))),
            ResourceKind::Leaf => {
                let Some(leaf_id) = resource.as_leaf() else {
                    return Ok(None);
                };
                Ok(self
                    .leaves
                    .get(leaf_id)
                    .await?
                    .map(|leaf| (leaf.container_id, 0, 1)))
            }
        }
    }

    async fn inherited_on(
        &self,
        container: &ResourceRef,
        principal_id: Option<PrincipalId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Grant>> {
        let rows = self.checker.grants_on(container, principal_id, now).await?;
        Ok(rows.into_iter().filter(Grant::propagates).collect())
    }
}
