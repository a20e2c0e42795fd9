//! Pure read-side tree algorithms over a [`NodeStore`].
//!
//! Every walk is iterative and bounded by a visited set. These functions are
//! the ones used to *prevent* cycles, so they must terminate even if the
//! stored parent graph is already corrupt. Walks never leave the namespace
//! of the node they start from.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::NodeId;
use canopy_entity::node::Node;
use canopy_store::NodeStore;

/// Result of walking parent pointers upward from a node.
#[derive(Debug, Clone, Default)]
pub struct Ancestry {
    /// The start node followed by each ancestor, nearest first.
    pub chain: Vec<Node>,
    /// Whether the walk stopped because it revisited a node.
    pub cycle_detected: bool,
}

impl Ancestry {
    /// Whether `id` appears in the chain (the start node included).
    pub fn contains(&self, id: NodeId) -> bool {
        self.chain.iter().any(|n| n.id == id)
    }
}

/// Iterative, cycle-tolerant traversals over a node store.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    nodes: Arc<dyn NodeStore>,
}

impl TreeWalker {
    /// Creates a walker over the given store.
    pub fn new(nodes: Arc<dyn NodeStore>) -> Self {
        Self { nodes }
    }

    /// Walks `parent_id` upward from `start`.
    ///
    /// Stops at a root, at a dangling parent reference, at a parent in a
    /// different namespace, or on revisiting a node. An absent `start` yields
    /// an empty chain.
    pub async fn ancestry(&self, start: NodeId) -> AppResult<Ancestry> {
        let mut ancestry = Ancestry::default();
        let mut visited = HashSet::new();
        let mut cursor = Some(start);

        while let Some(id) = cursor {
            if !visited.insert(id) {
                warn!(start = %start, revisited = %id, "Parent cycle detected during ancestry walk");
                ancestry.cycle_detected = true;
                break;
            }

            let Some(node) = self.nodes.get(id).await? else {
                break;
            };

            if let Some(first) = ancestry.chain.first() {
                if node.namespace != first.namespace {
                    warn!(
                        start = %start,
                        node = %node.id,
                        "Parent reference crosses namespaces, stopping walk"
                    );
                    break;
                }
            }

            cursor = node.parent_id;
            ancestry.chain.push(node);
        }

        Ok(ancestry)
    }

    /// Whether `ancestor_id` is `candidate_id` itself or one of its ancestors.
    pub async fn is_descendant_or_self(
        &self,
        candidate_id: NodeId,
        ancestor_id: NodeId,
    ) -> AppResult<bool> {
        if candidate_id == ancestor_id {
            return Ok(true);
        }
        Ok(self.ancestry(candidate_id).await?.contains(ancestor_id))
    }

    /// Descendants of `root_id` in display preorder, the root excluded.
    pub async fn collect_descendants(&self, root_id: NodeId) -> AppResult<Vec<NodeId>> {
        Ok(self
            .descendants_with_depth(root_id)
            .await?
            .into_iter()
            .map(|(node, _)| node.id)
            .collect())
    }

    /// Descendants of `root_id` with their depth below it (children are 1).
    ///
    /// Uses an explicit stack; children are visited in display order. An
    /// absent root yields an empty list.
    pub async fn descendants_with_depth(&self, root_id: NodeId) -> AppResult<Vec<(Node, u32)>> {
        let Some(root) = self.nodes.get(root_id).await? else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        let mut visited = HashSet::from([root.id]);
        let namespace = root.namespace;
        let mut stack = vec![(root, 0u32)];

        while let Some((node, depth)) = stack.pop() {
            let children = self.nodes.children_of(node.id).await?;
            // Reversed so the first child in display order is expanded next.
            for child in children.into_iter().rev() {
                if child.namespace != namespace {
                    warn!(parent = %node.id, child = %child.id, "Skipping cross-namespace child");
                    continue;
                }
                if !visited.insert(child.id) {
                    warn!(parent = %node.id, child = %child.id, "Child already visited, parent graph is cyclic");
                    continue;
                }
                stack.push((child, depth + 1));
            }
            if depth > 0 {
                out.push((node, depth));
            }
        }

        Ok(out)
    }

    /// Number of hops from `id` to the root of its tree.
    pub async fn depth(&self, id: NodeId) -> AppResult<u32> {
        let ancestry = self.ancestry(id).await?;
        if ancestry.chain.is_empty() {
            return Err(AppError::not_found(format!("Node {id} not found")));
        }
        Ok((ancestry.chain.len() - 1) as u32)
    }

    /// The nodes from the root down to `id`, inclusive.
    pub async fn breadcrumbs(&self, id: NodeId) -> AppResult<Vec<Node>> {
        let mut chain = self.ancestry(id).await?.chain;
        if chain.is_empty() {
            return Err(AppError::not_found(format!("Node {id} not found")));
        }
        chain.reverse();
        Ok(chain)
    }
}
