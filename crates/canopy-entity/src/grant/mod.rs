//! Permission grant entities.

pub mod access;
pub mod model;

pub use access::AccessLevel;
pub use model::{Grant, NewGrant, ResourceKind, ResourceRef};
