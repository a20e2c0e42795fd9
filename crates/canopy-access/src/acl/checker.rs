//! Direct grant lookup against the grant store.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use canopy_core::result::AppResult;
use canopy_core::types::PrincipalId;
use canopy_entity::grant::{AccessLevel, Grant, ResourceRef};
use canopy_store::GrantStore;

/// Reads the grants stored directly on a resource.
#[derive(Debug, Clone)]
pub struct GrantChecker {
    /// Grant rows.
    grants: Arc<dyn GrantStore>,
    /// Skip rows whose `expires_at` has passed.
    honor_expiry: bool,
}

impl GrantChecker {
    /// Creates a new checker.
    pub fn new(grants: Arc<dyn GrantStore>, honor_expiry: bool) -> Self {
        Self {
            grants,
            honor_expiry,
        }
    }

    /// Live grants on a resource, optionally narrowed to one principal.
    pub async fn grants_on(
        &self,
        resource: &ResourceRef,
        principal_id: Option<PrincipalId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Grant>> {
        let rows = self.grants.grants_on(resource).await?;
        Ok(rows
            .into_iter()
            .filter(|g| principal_id.is_none_or(|p| g.principal_id == p))
            .filter(|g| self.is_live(g, now))
            .collect())
    }

    /// Highest level among a principal's live direct grants on a resource.
    pub async fn highest_direct(
        &self,
        resource: &ResourceRef,
        principal_id: PrincipalId,
    ) -> AppResult<Option<AccessLevel>> {
        let entries = self
            .grants_on(resource, Some(principal_id), Utc::now())
            .await?;
        Ok(entries.iter().map(|g| g.access).max())
    }

    fn is_live(&self, grant: &Grant, now: DateTime<Utc>) -> bool {
        !self.honor_expiry || !grant.is_expired_at(now)
    }
}
