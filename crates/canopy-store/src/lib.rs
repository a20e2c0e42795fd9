//! # canopy-store
//!
//! Record-store contracts for nodes, grants, and leaf resources, plus an
//! in-memory backend.
//!
//! Stores are deliberately dumb: they persist rows and answer lookups.
//! Structural invariants are enforced by the mutation engine so that
//! backends can be swapped without duplicating rules. The one obligation a
//! backend must honour is optimistic version checking on
//! [`NodeStore::set_parent`] (see [`VersionGuard`]).

pub mod traits;

#[cfg(feature = "memory")]
pub mod memory;

pub use traits::{GrantFilter, GrantStore, LeafStore, NodeStore, VersionGuard};

#[cfg(feature = "memory")]
pub use memory::{MemoryGrantStore, MemoryLeafStore, MemoryNodeStore};
