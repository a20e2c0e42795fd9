//! Grant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canopy_core::types::{GrantId, LeafId, NodeId, PrincipalId};

use super::access::AccessLevel;

/// Resource kind a grant can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A tree node (folder or placement).
    Container,
    /// A leaf resource attached beneath a container (a file).
    Leaf,
}

impl ResourceKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Leaf => "leaf",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to a grantable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Container or leaf.
    pub kind: ResourceKind,
    /// The node or leaf ID.
    pub id: Uuid,
}

impl ResourceRef {
    /// Reference a container node.
    pub fn container(id: NodeId) -> Self {
        Self {
            kind: ResourceKind::Container,
            id: id.into_uuid(),
        }
    }

    /// Reference a leaf resource.
    pub fn leaf(id: LeafId) -> Self {
        Self {
            kind: ResourceKind::Leaf,
            id: id.into_uuid(),
        }
    }

    /// The node ID, if this references a container.
    pub fn as_node(&self) -> Option<NodeId> {
        match self.kind {
            ResourceKind::Container => Some(NodeId::from_uuid(self.id)),
            ResourceKind::Leaf => None,
        }
    }

    /// The leaf ID, if this references a leaf.
    pub fn as_leaf(&self) -> Option<LeafId> {
        match self.kind {
            ResourceKind::Leaf => Some(LeafId::from_uuid(self.id)),
            ResourceKind::Container => None,
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A permission grant. Rows are append/delete-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Unique grant identifier.
    pub id: GrantId,
    /// The subject receiving access.
    pub principal_id: PrincipalId,
    /// The resource this grant applies to.
    pub resource: ResourceRef,
    /// The access level.
    pub access: AccessLevel,
    /// Whether the grant flows down to descendants (containers only).
    pub inherit: bool,
    /// Who created the grant.
    pub granted_by: Option<PrincipalId>,
    /// When this grant expires (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// When this grant was created.
    pub created_at: DateTime<Utc>,
}

impl Grant {
    /// Check if this grant has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against a fixed instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Whether this grant reaches descendants of its resource.
    pub fn propagates(&self) -> bool {
        self.inherit && self.resource.kind == ResourceKind::Container
    }
}

/// Data required to add a grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGrant {
    /// The subject receiving access.
    pub principal_id: PrincipalId,
    /// The resource.
    pub resource: ResourceRef,
    /// The access level.
    pub access: AccessLevel,
    /// Inherit flag; ignored for leaf resources.
    #[serde(default)]
    pub inherit: bool,
    /// Who creates the grant.
    #[serde(default)]
    pub granted_by: Option<PrincipalId>,
    /// Optional expiry.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewGrant {
    /// A grant with no granter and no expiry.
    pub fn new(
        principal_id: PrincipalId,
        resource: ResourceRef,
        access: AccessLevel,
        inherit: bool,
    ) -> Self {
        Self {
            principal_id,
            resource,
            access,
            inherit,
            granted_by: None,
            expires_at: None,
        }
    }

    /// Materialize the row a store will hold.
    pub fn into_grant(self) -> Grant {
        let inherit = self.inherit && self.resource.kind == ResourceKind::Container;
        Grant {
            id: GrantId::new(),
            principal_id: self.principal_id,
            resource: self.resource,
            access: self.access,
            inherit,
            granted_by: self.granted_by,
            expires_at: self.expires_at,
            created_at: Utc::now(),
        }
    }
}
