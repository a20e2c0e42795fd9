//! Node entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use canopy_core::AppError;
use canopy_core::types::{NamespaceId, NodeId};

/// What a node represents. Both kinds share identical tree semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A folder.
    Container,
    /// An org-chart position.
    Placement,
}

/// How many parentless nodes a namespace may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootPolicy {
    /// Exactly one designated root (folder trees).
    Single,
    /// Any number of top-level nodes (org charts).
    Multiple,
}

impl NodeKind {
    /// The root policy for namespaces of this kind.
    pub fn root_policy(&self) -> RootPolicy {
        match self {
            Self::Container => RootPolicy::Single,
            Self::Placement => RootPolicy::Multiple,
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Placement => "placement",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "container" | "folder" => Ok(Self::Container),
            "placement" | "position" => Ok(Self::Placement),
            _ => Err(AppError::validation(format!("Invalid node kind: '{s}'"))),
        }
    }
}

/// One entry in a namespaced forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Scoping key; parents always share it.
    pub namespace: NamespaceId,
    /// Parent node (None for a root).
    pub parent_id: Option<NodeId>,
    /// Folder or placement.
    pub kind: NodeKind,
    /// Display label.
    pub label: String,
    /// Row version, bumped by the store on every write.
    pub version: u64,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Check if this is a root node (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Case-insensitive sort key used by every display listing.
    pub fn sort_key(&self) -> (String, NodeId) {
        (self.label.to_lowercase(), self.id)
    }
}

/// Data required to insert a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNode {
    /// Target namespace.
    pub namespace: NamespaceId,
    /// Parent node (None for a root insert).
    pub parent_id: Option<NodeId>,
    /// Folder or placement.
    pub kind: NodeKind,
    /// Display label.
    pub label: String,
}

impl NewNode {
    /// A root insert.
    pub fn root(namespace: NamespaceId, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            namespace,
            parent_id: None,
            kind,
            label: label.into(),
        }
    }

    /// A child insert.
    pub fn child(
        namespace: NamespaceId,
        parent_id: NodeId,
        kind: NodeKind,
        label: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            parent_id: Some(parent_id),
            kind,
            label: label.into(),
        }
    }

    /// Materialize the row a store will hold, with a fresh id and version 1.
    pub fn into_node(self) -> Node {
        let now = Utc::now();
        Node {
            id: NodeId::new(),
            namespace: self.namespace,
            parent_id: self.parent_id,
            kind: self.kind,
            label: self.label,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}
