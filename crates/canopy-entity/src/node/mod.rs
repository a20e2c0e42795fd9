//! Tree node entities.

pub mod model;
pub mod tree;

pub use model::{NewNode, Node, NodeKind, RootPolicy};
pub use tree::TreeNode;
