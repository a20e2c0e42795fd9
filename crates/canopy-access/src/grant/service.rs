//! Share, revoke, and list grants.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use canopy_core::error::AppError;
use canopy_core::events::{DomainEvent, EventPayload, EventPublisher, GrantEvent};
use canopy_core::result::AppResult;
use canopy_core::types::{GrantId, PrincipalId};
use canopy_entity::grant::{Grant, NewGrant, ResourceRef};
use canopy_store::{GrantFilter, GrantStore};

/// Manages grant rows on resources.
///
/// Rows are never edited in place: changing a principal's level means
/// revoking and sharing again.
#[derive(Debug, Clone)]
pub struct GrantService {
    /// Grant rows.
    grants: Arc<dyn GrantStore>,
    /// Domain event publisher.
    events: EventPublisher,
}

impl GrantService {
    /// Creates a new grant service.
    pub fn new(grants: Arc<dyn GrantStore>, events: EventPublisher) -> Self {
        Self { grants, events }
    }

    /// Adds a grant.
    ///
    /// The inherit flag is dropped for leaf resources. An expiry in the past
    /// is rejected.
    pub async fn share(&self, request: NewGrant) -> AppResult<Grant> {
        if request.expires_at.is_some_and(|exp| exp <= Utc::now()) {
            return Err(AppError::validation("Grant expiry must be in the future"));
        }

        let grant = self.grants.add(request.into_grant()).await?;

        info!(
            grant_id = %grant.id,
            principal_id = %grant.principal_id,
            resource = %grant.resource,
            access = %grant.access,
            inherit = grant.inherit,
            "Grant added"
        );
        self.publish(
            grant.granted_by,
            GrantEvent::Shared {
                grant_id: grant.id,
                principal_id: grant.principal_id,
                resource_type: grant.resource.kind.to_string(),
                resource_id: grant.resource.id,
                access: grant.access.to_string(),
            },
        );

        Ok(grant)
    }

    /// Removes every grant on a resource, or only one principal's.
    pub async fn revoke(
        &self,
        actor: Option<PrincipalId>,
        resource: ResourceRef,
        principal_id: Option<PrincipalId>,
    ) -> AppResult<usize> {
        let mut filter = GrantFilter::on(resource);
        filter.principal_id = principal_id;
        self.remove(actor, resource, &filter).await
    }

    /// Removes a single grant row on a resource.
    pub async fn revoke_grant(
        &self,
        actor: Option<PrincipalId>,
        resource: ResourceRef,
        grant_id: GrantId,
    ) -> AppResult<usize> {
        let filter = GrantFilter {
            grant_id: Some(grant_id),
            resource: Some(resource),
            ..GrantFilter::default()
        };
        self.remove(actor, resource, &filter).await
    }

    /// Grants stored directly on a resource, oldest first.
    pub async fn grants_on(&self, resource: &ResourceRef) -> AppResult<Vec<Grant>> {
        self.grants.grants_on(resource).await
    }

    /// Grants held by a principal, oldest first.
    pub async fn grants_for(&self, principal_id: PrincipalId) -> AppResult<Vec<Grant>> {
        self.grants.grants_for(principal_id).await
    }

    async fn remove(
        &self,
        actor: Option<PrincipalId>,
        resource: ResourceRef,
        filter: &GrantFilter,
    ) -> AppResult<usize> {
        let removed = self.grants.remove_all(filter).await?;
        if removed > 0 {
            info!(resource = %resource, removed, "Grants revoked");
            self.publish(
                actor,
                GrantEvent::Revoked {
                    resource_type: resource.kind.to_string(),
                    resource_id: resource.id,
                    removed,
                },
            );
        }
        Ok(removed)
    }

    fn publish(&self, actor: Option<PrincipalId>, event: GrantEvent) {
        self.events
            .publish(DomainEvent::new(actor, EventPayload::Grant(event)));
    }
}
