//! # canopy
//!
//! Hierarchical resource trees with cycle-safe structural mutation and
//! layered access resolution.
//!
//! Folder trees and org charts share one engine: [`MutationEngine`] enforces
//! the forest invariants, [`TreeView`] renders and exports subtrees, and
//! [`AccessResolver`] combines direct and inherited grants. [`Canopy`] wires
//! them over a shared set of stores.

pub mod app;
pub mod telemetry;

pub use app::Canopy;

pub use canopy_access::{
    AccessResolver, AccessSource, EffectiveAccess, GrantCleanup, GrantService, PrincipalAccess,
};
pub use canopy_core::config::CanopyConfig;
pub use canopy_core::types::{GrantId, LeafId, NamespaceId, NodeId, PrincipalId};
pub use canopy_core::{AppError, AppResult, ErrorKind};
pub use canopy_entity::{
    AccessLevel, Grant, LeafResource, NewGrant, NewNode, Node, NodeKind, ResourceKind,
    ResourceRef, TreeNode,
};
pub use canopy_store::{GrantStore, LeafStore, NodeStore, VersionGuard};
pub use canopy_tree::{
    DeleteHook, DeleteReport, ExportEntry, MutationEngine, SubtreeExport, TreeError, TreeView,
};
