//! Leaf resource model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use canopy_core::types::{LeafId, NodeId};

/// A non-tree resource attached to a container (a file, a lesson-plan document).
///
/// Only the attachment is modelled here; object bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafResource {
    /// Unique leaf identifier.
    pub id: LeafId,
    /// The container this leaf sits in.
    pub container_id: NodeId,
    /// Display name.
    pub name: String,
    /// When the leaf was attached.
    pub created_at: DateTime<Utc>,
}

impl LeafResource {
    /// Attach a new leaf to a container.
    pub fn new(container_id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id: LeafId::new(),
            container_id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
