//! Create, rename, reparent, insert-above, and detach.

use tracing::{error, info, warn};

use canopy_core::events::NodeEvent;
use canopy_core::types::{NamespaceId, NodeId};
use canopy_entity::node::{NewNode, Node, NodeKind, RootPolicy};
use canopy_store::VersionGuard;

use super::MutationEngine;
use crate::error::TreeError;

impl MutationEngine {
    /// Inserts a node as a root (`parent_id = None`) or beneath an existing parent.
    pub async fn create(&self, spec: NewNode) -> Result<Node, TreeError> {
        let label = self.validate_label(&spec.label)?;

        let single_root = spec.parent_id.is_none() && spec.kind.root_policy() == RootPolicy::Single;
        match spec.parent_id {
            Some(parent_id) => {
                self.require_parent(parent_id, &spec).await?;
            }
            None => {
                if single_root && !self.nodes.roots(spec.namespace).await?.is_empty() {
                    return Err(TreeError::RootViolation {
                        namespace: spec.namespace,
                        node: None,
                    });
                }
            }
        }

        let node = NewNode { label, ..spec }.into_node();
        // A concurrent root create can land between the check above and the
        // write; insert_root closes that gap with a Conflict.
        if single_root {
            self.nodes.insert_root(node.clone()).await?;
        } else {
            self.nodes.insert(node.clone()).await?;
        }

        info!(
            node_id = %node.id,
            namespace = %node.namespace,
            parent_id = ?node.parent_id,
            kind = %node.kind,
            "Node created"
        );
        self.publish(NodeEvent::Created {
            node_id: node.id,
            namespace: node.namespace,
            parent_id: node.parent_id,
        });

        Ok(node)
    }

    /// Changes a node's display label.
    pub async fn rename(&self, id: NodeId, label: &str) -> Result<Node, TreeError> {
        let label = self.validate_label(label)?;
        self.get(id).await?;

        let node = self.nodes.set_label(id, &label).await?;

        info!(node_id = %id, label = %node.label, "Node renamed");
        self.publish(NodeEvent::Renamed {
            node_id: id,
            label: node.label.clone(),
        });

        Ok(node)
    }

    /// Moves a node (with its whole subtree) under a new parent, or to the top level.
    ///
    /// Descendants keep their `parent_id`; they move implicitly.
    pub async fn reparent(
        &self,
        id: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<Node, TreeError> {
        let node = self.get(id).await?;
        if node.parent_id == new_parent {
            return Ok(node);
        }
        let mut guard = VersionGuard::on(&node);

        match new_parent {
            Some(parent_id) => {
                if parent_id == id {
                    return Err(TreeError::Cycle {
                        node: id,
                        parent: parent_id,
                    });
                }
                let parent = self.get_parent(parent_id).await?;
                check_compatible(&parent, node.namespace, node.kind)?;

                let ancestry = self.walker.ancestry(parent_id).await?;
                if ancestry.contains(id) || ancestry.cycle_detected {
                    return Err(TreeError::Cycle {
                        node: id,
                        parent: parent_id,
                    });
                }
                for seen in &ancestry.chain {
                    guard.expect(seen.id, seen.version);
                }
            }
            None => {
                if node.kind.root_policy() == RootPolicy::Single {
                    let other_root = self
                        .nodes
                        .roots(node.namespace)
                        .await?
                        .into_iter()
                        .any(|root| root.id != id);
                    if other_root {
                        return Err(TreeError::RootViolation {
                            namespace: node.namespace,
                            node: Some(id),
                        });
                    }
                }
            }
        }

        let moved = self.nodes.set_parent(id, new_parent, &guard).await?;

        info!(
            node_id = %id,
            from = ?node.parent_id,
            to = ?new_parent,
            guarded_rows = guard.len(),
            "Node moved"
        );
        self.publish(NodeEvent::Moved {
            node_id: id,
            from: node.parent_id,
            to: new_parent,
        });

        Ok(moved)
    }

    /// Splices a new node between `target_id` and its current parent.
    ///
    /// The new node takes the target's namespace and kind. If moving the
    /// target beneath it fails, the new node is deleted again and the
    /// original error is returned.
    pub async fn insert_above(&self, target_id: NodeId, label: &str) -> Result<Node, TreeError> {
        let label = self.validate_label(label)?;
        let target = self.get(target_id).await?;

        // Inserted directly: when the target is a single-root namespace's root,
        // the splice briefly holds two roots until step two lands.
        let spliced = NewNode {
            namespace: target.namespace,
            parent_id: target.parent_id,
            kind: target.kind,
            label,
        }
        .into_node();
        self.nodes.insert(spliced.clone()).await?;

        let guard = VersionGuard::on(&target);
        if let Err(err) = self
            .nodes
            .set_parent(target_id, Some(spliced.id), &guard)
            .await
        {
            warn!(
                target_id = %target_id,
                spliced_id = %spliced.id,
                error = %err,
                "Insert-above failed, rolling back spliced node"
            );
            match self.nodes.delete(spliced.id).await {
                Ok(_) => {}
                Err(rollback) => error!(
                    spliced_id = %spliced.id,
                    error = %rollback,
                    "Rollback of spliced node failed, node is orphaned"
                ),
            }
            return Err(err.into());
        }

        info!(
            node_id = %spliced.id,
            target_id = %target_id,
            parent_id = ?spliced.parent_id,
            "Node inserted above"
        );
        self.publish(NodeEvent::InsertedAbove {
            node_id: spliced.id,
            target_id,
        });

        Ok(spliced)
    }

    /// Cuts a node loose from its parent, making it the root of its own subtree.
    ///
    /// Children stay attached to it. Unlike [`reparent`](Self::reparent) with
    /// `None`, this is permitted in single-root namespaces: it is the explicit
    /// step callers take before removing a subtree without cascading.
    pub async fn detach(&self, id: NodeId) -> Result<Node, TreeError> {
        let node = self.get(id).await?;
        let Some(former_parent) = node.parent_id else {
            return Ok(node);
        };

        let detached = self
            .nodes
            .set_parent(id, None, &VersionGuard::on(&node))
            .await?;

        info!(node_id = %id, former_parent = %former_parent, "Node detached");
        self.publish(NodeEvent::Detached {
            node_id: id,
            former_parent,
        });

        Ok(detached)
    }

    async fn get_parent(&self, parent_id: NodeId) -> Result<Node, TreeError> {
        self.nodes
            .get(parent_id)
            .await?
            .ok_or_else(|| TreeError::InvalidParent {
                parent: parent_id,
                reason: "parent does not exist".into(),
            })
    }

    async fn require_parent(&self, parent_id: NodeId, spec: &NewNode) -> Result<Node, TreeError> {
        let parent = self.get_parent(parent_id).await?;
        check_compatible(&parent, spec.namespace, spec.kind)?;
        Ok(parent)
    }
}

fn check_compatible(parent: &Node, namespace: NamespaceId, kind: NodeKind) -> Result<(), TreeError> {
    if parent.namespace != namespace {
        return Err(TreeError::InvalidParent {
            parent: parent.id,
            reason: format!("parent belongs to namespace {}", parent.namespace),
        });
    }
    if parent.kind != kind {
        return Err(TreeError::InvalidParent {
            parent: parent.id,
            reason: format!("a {} cannot hold a {kind}", parent.kind),
        });
    }
    Ok(())
}
