//! Effective access resolution.
//!
//! Resolution order:
//! 1. Collect the principal's grants on the resource itself.
//! 2. Walk the container ancestry, collecting only inheriting grants.
//! 3. Rank the collected grants (all of them, or only the nearest level
//!    that has any, per [`ResolutionStrategy`]).
//! 4. On equal rank the most specific grant wins; within one level the
//!    newest row is surfaced.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use canopy_core::config::access::{AccessConfig, ResolutionStrategy};
use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::PrincipalId;
use canopy_entity::grant::{AccessLevel, Grant, ResourceRef};
use canopy_store::{GrantStore, LeafStore, NodeStore};
use canopy_tree::TreeWalker;

use super::checker::GrantChecker;
use super::inheritance::{GrantLayer, InheritanceWalker};

/// Where the winning grant was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessSource {
    /// Stored on the resource itself.
    Direct,
    /// Inherited from an ancestor container.
    Inherited {
        /// The container holding the grant.
        from: ResourceRef,
        /// Hops between the resource and that container.
        distance: u32,
    },
}

/// Result of resolving a principal's access to a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveAccess {
    /// The resolved level.
    pub level: AccessLevel,
    /// The grant that produced it.
    pub source_grant: Grant,
    /// Where that grant sits relative to the resource.
    pub source: AccessSource,
}

impl EffectiveAccess {
    /// Whether the resolved level is at least `minimum`.
    pub fn allows(&self, minimum: AccessLevel) -> bool {
        self.level.has_at_least(minimum)
    }
}

/// One row of a "shared with" listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalAccess {
    /// The principal.
    pub principal_id: PrincipalId,
    /// Their effective access.
    pub access: EffectiveAccess,
}

/// Resolves effective access from direct and inherited grants.
///
/// Every method is a pure read and safe to call speculatively.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    /// Grant collection along the ancestry.
    inheritance: InheritanceWalker,
    /// Resolver settings.
    config: AccessConfig,
}

impl AccessResolver {
    /// Creates a resolver over the given stores.
    pub fn new(
        nodes: Arc<dyn NodeStore>,
        leaves: Arc<dyn LeafStore>,
        grants: Arc<dyn GrantStore>,
        config: AccessConfig,
    ) -> Self {
        let checker = GrantChecker::new(grants, config.honor_expiry);
        Self {
            inheritance: InheritanceWalker::new(TreeWalker::new(nodes), leaves, checker),
            config,
        }
    }

    /// The principal's effective level on a resource, or `None`.
    pub async fn effective_access(
        &self,
        principal_id: PrincipalId,
        resource: ResourceRef,
    ) -> AppResult<Option<AccessLevel>> {
        Ok(self
            .resolve(principal_id, resource)
            .await?
            .map(|access| access.level))
    }

    /// The principal's effective access with the grant that decided it.
    pub async fn resolve(
        &self,
        principal_id: PrincipalId,
        resource: ResourceRef,
    ) -> AppResult<Option<EffectiveAccess>> {
        let layers = self.inheritance.layers(resource, Some(principal_id)).await?;
        let decision = self.pick(&layers);

        debug!(
            principal_id = %principal_id,
            resource = %resource,
            levels = layers.len(),
            level = ?decision.as_ref().map(|d| d.level),
            source = ?decision.as_ref().map(|d| d.source),
            "Resolved effective access"
        );

        Ok(decision)
    }

    /// Every principal with access to a resource, one entry each.
    ///
    /// Ordered by level (highest first), then principal.
    pub async fn principals_with_access(
        &self,
        resource: ResourceRef,
    ) -> AppResult<Vec<PrincipalAccess>> {
        let layers = self.inheritance.layers(resource, None).await?;

        let mut per_principal: BTreeMap<PrincipalId, Vec<GrantLayer>> = BTreeMap::new();
        for layer in layers {
            let mut split: BTreeMap<PrincipalId, Vec<Grant>> = BTreeMap::new();
            for grant in layer.grants {
                split.entry(grant.principal_id).or_default().push(grant);
            }
            for (principal_id, grants) in split {
                per_principal.entry(principal_id).or_default().push(GrantLayer {
                    resource: layer.resource,
                    distance: layer.distance,
                    grants,
                });
            }
        }

        let mut listing: Vec<PrincipalAccess> = per_principal
            .into_iter()
            .filter_map(|(principal_id, layers)| {
                self.pick(&layers).map(|access| PrincipalAccess {
                    principal_id,
                    access,
                })
            })
            .collect();
        listing.sort_by(|a, b| {
            b.access
                .level
                .cmp(&a.access.level)
                .then_with(|| a.principal_id.cmp(&b.principal_id))
        });
        Ok(listing)
    }

    /// The subset of `resources` the principal reaches at `minimum` or above.
    ///
    /// Input order is preserved.
    pub async fn filter_accessible(
        &self,
        principal_id: PrincipalId,
        resources: &[ResourceRef],
        minimum: AccessLevel,
    ) -> AppResult<Vec<ResourceRef>> {
        let checks = resources.iter().map(|resource| async move {
            let level = self.effective_access(principal_id, *resource).await?;
            Ok::<_, AppError>((*resource, level))
        });

        Ok(try_join_all(checks)
            .await?
            .into_iter()
            .filter(|(_, level)| level.is_some_and(|l| l.has_at_least(minimum)))
            .map(|(resource, _)| resource)
            .collect())
    }

    /// Fails with an authorization error unless the principal has `minimum`.
    pub async fn require(
        &self,
        principal_id: PrincipalId,
        resource: ResourceRef,
        minimum: AccessLevel,
    ) -> AppResult<EffectiveAccess> {
        match self.resolve(principal_id, resource).await? {
            Some(access) if access.allows(minimum) => Ok(access),
            other => {
                debug!(
                    principal_id = %principal_id,
                    resource = %resource,
                    required = %minimum,
                    actual = ?other.map(|a| a.level),
                    "Access denied"
                );
                Err(AppError::authorization(format!(
                    "{minimum} access required on {resource}"
                )))
            }
        }
    }

    /// Picks the winning grant from layers ordered most specific first.
    fn pick(&self, layers: &[GrantLayer]) -> Option<EffectiveAccess> {
        let candidates = match self.config.strategy {
            ResolutionStrategy::HighestRank => layers,
            ResolutionStrategy::Nearest => &layers[..layers.len().min(1)],
        };

        let mut best: Option<(&GrantLayer, &Grant)> = None;
        for layer in candidates {
            for grant in &layer.grants {
                let wins = match best {
                    None => true,
                    Some((best_layer, best_grant)) => {
                        grant.access > best_grant.access
                            || (grant.access == best_grant.access
                                && layer.distance == best_layer.distance
                                && grant.created_at > best_grant.created_at)
                    }
                };
                if wins {
                    best = Some((layer, grant));
                }
            }
        }

        best.map(|(layer, grant)| EffectiveAccess {
            level: grant.access,
            source_grant: grant.clone(),
            source: if layer.distance == 0 {
                AccessSource::Direct
            } else {
                AccessSource::Inherited {
                    from: layer.resource,
                    distance: layer.distance,
                }
            },
        })
    }
}
