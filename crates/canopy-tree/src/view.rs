//! Nested tree rendering and flat subtree export.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use canopy_core::types::NodeId;
use canopy_entity::leaf::LeafResource;
use canopy_entity::node::{Node, TreeNode};
use canopy_store::{LeafStore, NodeStore};

use crate::algorithms::TreeWalker;
use crate::error::TreeError;

/// One node of an exported subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    /// The node row.
    pub node: Node,
    /// Depth below the export root (0 for the root).
    pub depth: u32,
    /// Labels from the export root down to this node, inclusive.
    pub path: Vec<String>,
    /// Leaves attached directly to this node.
    pub leaves: Vec<LeafResource>,
}

impl ExportEntry {
    /// The path joined with `/`.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }
}

/// Everything beneath a container, flattened for packaging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtreeExport {
    /// The export root.
    pub root: NodeId,
    /// The root and every descendant in display preorder.
    pub entries: Vec<ExportEntry>,
}

impl SubtreeExport {
    /// Total number of leaves across all entries.
    pub fn leaf_count(&self) -> usize {
        self.entries.iter().map(|e| e.leaves.len()).sum()
    }
}

/// Builds display trees and export listings.
#[derive(Debug, Clone)]
pub struct TreeView {
    /// Node rows.
    nodes: Arc<dyn NodeStore>,
    /// Leaf rows.
    leaves: Arc<dyn LeafStore>,
    /// Traversals.
    walker: TreeWalker,
}

impl TreeView {
    /// Creates a view over the given stores.
    pub fn new(nodes: Arc<dyn NodeStore>, leaves: Arc<dyn LeafStore>) -> Self {
        Self {
            walker: TreeWalker::new(Arc::clone(&nodes)),
            nodes,
            leaves,
        }
    }

    /// Builds the nested tree rooted at `id`.
    ///
    /// The descendant preorder is folded bottom-up with an explicit stack:
    /// the stack always holds the path from the root to the node being
    /// visited, and a frame is attached to its parent once the walk moves
    /// back above it.
    pub async fn tree(&self, id: NodeId) -> Result<TreeNode, TreeError> {
        let root = self.nodes.get(id).await?.ok_or(TreeError::NotFound(id))?;
        let descendants = self.walker.descendants_with_depth(id).await?;

        let mut stack = vec![self.frame(root, 0).await?];
        for (node, depth) in descendants {
            while stack.len() > depth as usize {
                fold(&mut stack);
            }
            stack.push(self.frame(node, depth).await?);
        }
        while stack.len() > 1 {
            fold(&mut stack);
        }

        let mut tree = stack.pop().ok_or(TreeError::NotFound(id))?;
        tree.child_count = tree.children.len() as u64;
        Ok(tree)
    }

    /// Lists the subtree rooted at `id` with the leaves attached to each node.
    pub async fn export(&self, id: NodeId) -> Result<SubtreeExport, TreeError> {
        let root = self.nodes.get(id).await?.ok_or(TreeError::NotFound(id))?;
        let descendants = self.walker.descendants_with_depth(id).await?;

        let mut entries = Vec::with_capacity(descendants.len() + 1);
        let mut path: Vec<String> = Vec::new();

        for (node, depth) in std::iter::once((root, 0)).chain(descendants) {
            path.truncate(depth as usize);
            path.push(node.label.clone());
            let leaves = self.leaves.leaves_in(node.id).await?;
            entries.push(ExportEntry {
                node,
                depth,
                path: path.clone(),
                leaves,
            });
        }

        Ok(SubtreeExport { root: id, entries })
    }

    async fn frame(&self, node: Node, depth: u32) -> Result<TreeNode, TreeError> {
        let leaf_count = self.leaves.leaves_in(node.id).await?.len() as u64;
        Ok(TreeNode {
            id: node.id,
            label: node.label,
            kind: node.kind,
            depth,
            child_count: 0,
            leaf_count,
            children: Vec::new(),
        })
    }
}

/// Pops the top frame and attaches it to the frame beneath.
fn fold(stack: &mut Vec<TreeNode>) {
    if let Some(mut done) = stack.pop() {
        done.child_count = done.children.len() as u64;
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done);
        }
    }
}
