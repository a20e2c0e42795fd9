//! Tree mutation domain events.

use serde::{Deserialize, Serialize};

use crate::types::{NamespaceId, NodeId};

/// Events emitted by committed structural mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeEvent {
    /// A node was inserted.
    Created {
        /// The new node.
        node_id: NodeId,
        /// Its namespace.
        namespace: NamespaceId,
        /// Its parent (None for a root).
        parent_id: Option<NodeId>,
    },
    /// A node's label changed.
    Renamed {
        /// The renamed node.
        node_id: NodeId,
        /// The new label.
        label: String,
    },
    /// A node was reparented.
    Moved {
        /// The moved node.
        node_id: NodeId,
        /// Previous parent.
        from: Option<NodeId>,
        /// New parent.
        to: Option<NodeId>,
    },
    /// A new ancestor was spliced above an existing node.
    InsertedAbove {
        /// The spliced node.
        node_id: NodeId,
        /// The node that now sits beneath it.
        target_id: NodeId,
    },
    /// A node was detached and became a root.
    Detached {
        /// The detached node.
        node_id: NodeId,
        /// Its former parent.
        former_parent: NodeId,
    },
    /// A delete finished.
    Deleted {
        /// The node the delete was issued for.
        node_id: NodeId,
        /// Every node removed by the operation, deepest first.
        removed: Vec<NodeId>,
        /// Number of leaf resources removed.
        leaves_removed: usize,
    },
}
