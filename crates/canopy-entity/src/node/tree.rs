//! Nested tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use canopy_core::types::NodeId;

use super::model::NodeKind;

/// A node in a rendered tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Node ID.
    pub id: NodeId,
    /// Display label.
    pub label: String,
    /// Folder or placement.
    pub kind: NodeKind,
    /// Depth relative to the rendered root (0 for the root itself).
    pub depth: u32,
    /// Number of direct children.
    pub child_count: u64,
    /// Number of leaf resources attached to this node.
    pub leaf_count: u64,
    /// Child nodes, in display order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Total number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children.iter());
        }
        total
    }
}
