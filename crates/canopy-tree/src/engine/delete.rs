//! Cascading and child-detaching deletes.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use canopy_core::events::NodeEvent;
use canopy_core::types::{LeafId, NodeId};
use canopy_entity::leaf::LeafResource;
use canopy_entity::node::Node;
use canopy_store::VersionGuard;

use super::MutationEngine;
use crate::error::TreeError;

/// What a delete actually removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    /// The node the delete was issued for.
    pub root: Option<NodeId>,
    /// Removed nodes in removal order (deepest first).
    pub removed: Vec<NodeId>,
    /// Removed leaf resources.
    pub leaves_removed: Vec<LeafId>,
    /// Children cut loose instead of deleted.
    pub detached: Vec<NodeId>,
}

impl DeleteReport {
    /// Whether nothing was removed or detached.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.leaves_removed.is_empty() && self.detached.is_empty()
    }
}

impl MutationEngine {
    /// Deletes a node, every descendant, and every leaf attached to any of them.
    ///
    /// Leaves go first, then nodes in descending depth so no node is removed
    /// while it still has a live child. Rows that are already gone are
    /// skipped, so re-running after an interruption finishes the job. A
    /// store failure part way through returns [`TreeError::PartialDelete`]
    /// listing what was removed.
    pub async fn delete_cascade(&self, id: NodeId) -> Result<DeleteReport, TreeError> {
        let Some(root) = self.nodes.get(id).await? else {
            return Ok(DeleteReport {
                root: Some(id),
                ..DeleteReport::default()
            });
        };

        let base_depth = self.walker.depth(id).await?;
        let mut doomed: Vec<(Node, u32)> = self
            .walker
            .descendants_with_depth(id)
            .await?
            .into_iter()
            .map(|(node, below)| (node, base_depth + below))
            .collect();
        doomed.push((root, base_depth));
        // Stable: within a depth, removal follows display order.
        doomed.sort_by(|(a, da), (b, db)| db.cmp(da).then_with(|| a.sort_key().cmp(&b.sort_key())));

        let mut report = DeleteReport {
            root: Some(id),
            ..DeleteReport::default()
        };

        for (node, _) in &doomed {
            self.delete_leaves_of(node.id, &mut report).await?;
        }

        for (node, depth) in &doomed {
            match self.nodes.delete(node.id).await {
                Ok(true) => {
                    report.removed.push(node.id);
                    self.notify_node(node).await;
                }
                Ok(false) => {
                    warn!(node_id = %node.id, depth, "Node already absent, skipping");
                }
                Err(err) => {
                    warn!(
                        root = %id,
                        node_id = %node.id,
                        removed = report.removed.len(),
                        error = %err,
                        "Cascade delete interrupted"
                    );
                    return Err(TreeError::PartialDelete {
                        removed: report.removed,
                        leaves_removed: report.leaves_removed,
                        source: err,
                    });
                }
            }
        }

        info!(
            node_id = %id,
            nodes = report.removed.len(),
            leaves = report.leaves_removed.len(),
            "Subtree deleted"
        );
        self.publish(NodeEvent::Deleted {
            node_id: id,
            removed: report.removed.clone(),
            leaves_removed: report.leaves_removed.len(),
        });

        Ok(report)
    }

    /// Deletes a single node after cutting each of its children loose.
    ///
    /// Every direct child becomes a root of its own subtree (the org-chart
    /// "remove placement" policy); only the node and its own leaves are
    /// removed.
    pub async fn delete_detaching_children(&self, id: NodeId) -> Result<DeleteReport, TreeError> {
        let Some(node) = self.nodes.get(id).await? else {
            return Ok(DeleteReport {
                root: Some(id),
                ..DeleteReport::default()
            });
        };

        let mut report = DeleteReport {
            root: Some(id),
            ..DeleteReport::default()
        };

        for child in self.nodes.children_of(id).await? {
            self.nodes
                .set_parent(child.id, None, &VersionGuard::on(&child))
                .await?;
            self.publish(NodeEvent::Detached {
                node_id: child.id,
                former_parent: id,
            });
            report.detached.push(child.id);
        }

        self.delete_leaves_of(id, &mut report).await?;

        if self.nodes.delete(id).await? {
            report.removed.push(id);
            self.notify_node(&node).await;
        }

        info!(
            node_id = %id,
            detached = report.detached.len(),
            leaves = report.leaves_removed.len(),
            "Node deleted, children detached"
        );
        self.publish(NodeEvent::Deleted {
            node_id: id,
            removed: report.removed.clone(),
            leaves_removed: report.leaves_removed.len(),
        });

        Ok(report)
    }

    async fn delete_leaves_of(
        &self,
        node_id: NodeId,
        report: &mut DeleteReport,
    ) -> Result<(), TreeError> {
        let leaves = match self.leaves.leaves_in(node_id).await {
            Ok(leaves) => leaves,
            Err(err) => return Err(partial(report, err)),
        };

        for leaf in leaves {
            match self.leaves.delete(leaf.id).await {
                Ok(true) => {
                    report.leaves_removed.push(leaf.id);
                    self.notify_leaf(&leaf).await;
                }
                Ok(false) => {}
                Err(err) => return Err(partial(report, err)),
            }
        }
        Ok(())
    }

    async fn notify_leaf(&self, leaf: &LeafResource) {
        for hook in &self.hooks {
            if let Err(err) = hook.leaf_deleted(leaf).await {
                warn!(leaf_id = %leaf.id, error = %err, "Delete hook failed for leaf");
            }
        }
    }

    async fn notify_node(&self, node: &Node) {
        for hook in &self.hooks {
            if let Err(err) = hook.node_deleted(node).await {
                warn!(node_id = %node.id, error = %err, "Delete hook failed for node");
            }
        }
    }
}

fn partial(report: &DeleteReport, source: canopy_core::AppError) -> TreeError {
    warn!(
        removed = report.removed.len(),
        leaves = report.leaves_removed.len(),
        error = %source,
        "Leaf cleanup interrupted"
    );
    TreeError::PartialDelete {
        removed: report.removed.clone(),
        leaves_removed: report.leaves_removed.clone(),
        source,
    }
}
