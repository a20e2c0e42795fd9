//! # canopy-entity
//!
//! Domain entity models for Canopy. Every struct in this crate is either a
//! stored row (nodes, grants, leaf resources) or a value object derived from
//! them (tree views, resource references). All derive `Debug`, `Clone`,
//! `Serialize` and `Deserialize`.

pub mod grant;
pub mod leaf;
pub mod node;

pub use grant::{AccessLevel, Grant, NewGrant, ResourceKind, ResourceRef};
pub use leaf::LeafResource;
pub use node::{NewNode, Node, NodeKind, RootPolicy, TreeNode};
