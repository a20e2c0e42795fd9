//! Store traits implemented by backends.

pub mod grant;
pub mod leaf;
pub mod node;

pub use grant::{GrantFilter, GrantStore};
pub use leaf::LeafStore;
pub use node::{NodeStore, VersionGuard};
