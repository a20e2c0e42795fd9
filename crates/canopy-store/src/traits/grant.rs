//! Grant store contract.

use async_trait::async_trait;

use canopy_core::result::AppResult;
use canopy_core::types::{GrantId, PrincipalId};
use canopy_entity::grant::{Grant, ResourceRef};

/// Predicate selecting grant rows for removal.
///
/// Every set field must match; an empty filter matches nothing so that a
/// forgotten field can never wipe the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantFilter {
    /// Match a single row.
    pub grant_id: Option<GrantId>,
    /// Match rows for this principal.
    pub principal_id: Option<PrincipalId>,
    /// Match rows on this resource.
    pub resource: Option<ResourceRef>,
}

impl GrantFilter {
    /// Rows on a resource.
    pub fn on(resource: ResourceRef) -> Self {
        Self {
            resource: Some(resource),
            ..Self::default()
        }
    }

    /// Rows for a principal.
    pub fn for_principal(principal_id: PrincipalId) -> Self {
        Self {
            principal_id: Some(principal_id),
            ..Self::default()
        }
    }

    /// A single row.
    pub fn by_id(grant_id: GrantId) -> Self {
        Self {
            grant_id: Some(grant_id),
            ..Self::default()
        }
    }

    /// Narrow to a principal.
    pub fn principal(mut self, principal_id: PrincipalId) -> Self {
        self.principal_id = Some(principal_id);
        self
    }

    /// Whether this filter constrains anything.
    pub fn is_empty(&self) -> bool {
        self.grant_id.is_none() && self.principal_id.is_none() && self.resource.is_none()
    }

    /// Whether a row matches.
    pub fn matches(&self, grant: &Grant) -> bool {
        if self.is_empty() {
            return false;
        }
        self.grant_id.is_none_or(|id| grant.id == id)
            && self.principal_id.is_none_or(|p| grant.principal_id == p)
            && self.resource.is_none_or(|r| grant.resource == r)
    }
}

/// Record store for permission grants. Append/delete only.
#[async_trait]
pub trait GrantStore: Send + Sync + std::fmt::Debug + 'static {
    /// All rows on a resource, oldest first.
    async fn grants_on(&self, resource: &ResourceRef) -> AppResult<Vec<Grant>>;

    /// All rows held by a principal, oldest first.
    async fn grants_for(&self, principal_id: PrincipalId) -> AppResult<Vec<Grant>>;

    /// Append a row.
    async fn add(&self, grant: Grant) -> AppResult<Grant>;

    /// Remove every row matching the filter. Returns the number removed.
    async fn remove_all(&self, filter: &GrantFilter) -> AppResult<usize>;
}
