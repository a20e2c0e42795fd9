//! Error type for structural tree operations.
//!
//! Invariant violations (`InvalidParent`, `Cycle`, `RootViolation`) are
//! raised before any write is issued. `Conflict` and `PartialDelete` come
//! from the store during multi-step operations and are never retried here.

use thiserror::Error;

use canopy_core::error::{AppError, ErrorKind};
use canopy_core::types::{LeafId, NamespaceId, NodeId};

/// Failure of a tree query or mutation.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The node does not exist.
    #[error("Node {0} not found")]
    NotFound(NodeId),

    /// The requested parent is absent, in another namespace, or of another kind.
    #[error("Invalid parent {parent}: {reason}")]
    InvalidParent {
        /// The rejected parent.
        parent: NodeId,
        /// Why it was rejected.
        reason: String,
    },

    /// The move would make a node its own ancestor.
    #[error("Moving {node} under {parent} would create a cycle")]
    Cycle {
        /// The node being moved.
        node: NodeId,
        /// The requested parent.
        parent: NodeId,
    },

    /// A second root would appear in a single-root namespace.
    #[error("Namespace {namespace} already has a root")]
    RootViolation {
        /// The namespace.
        namespace: NamespaceId,
        /// The node that would have become a root, if it already exists.
        node: Option<NodeId>,
    },

    /// A pre-check read went stale before commit.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// A cascading delete stopped part way through.
    #[error(
        "Cascade delete interrupted after removing {} nodes and {} leaves: {source}",
        .removed.len(),
        .leaves_removed.len()
    )]
    PartialDelete {
        /// Nodes removed before the failure, in removal order.
        removed: Vec<NodeId>,
        /// Leaves removed before the failure.
        leaves_removed: Vec<LeafId>,
        /// The store failure.
        #[source]
        source: AppError,
    },

    /// Input validation failed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Any other store failure.
    #[error("Store error: {0}")]
    Store(AppError),
}

impl From<AppError> for TreeError {
    fn from(err: AppError) -> Self {
        match err.kind {
            ErrorKind::Conflict => Self::Conflict(err.message),
            _ => Self::Store(err),
        }
    }
}

impl From<TreeError> for AppError {
    fn from(err: TreeError) -> Self {
        let kind = err.kind();
        match err {
            TreeError::Store(inner) => inner,
            other => AppError::new(kind, other.to_string()),
        }
    }
}

impl TreeError {
    /// The boundary error kind this maps to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidParent { .. } => ErrorKind::InvalidParent,
            Self::Cycle { .. } => ErrorKind::Cycle,
            Self::RootViolation { .. } => ErrorKind::RootViolation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::PartialDelete { .. } => ErrorKind::PartialDelete,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(inner) => inner.kind,
        }
    }
}
