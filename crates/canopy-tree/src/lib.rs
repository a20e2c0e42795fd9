//! # canopy-tree
//!
//! One engine for every parent-pointer forest in the portal: folder trees
//! (single root per namespace) and org charts (many top-level placements).
//!
//! ## Modules
//!
//! - `algorithms` — ancestry walks, descendant enumeration, depth, breadcrumbs
//! - `engine` — create, rename, reparent, insert-above, detach, cascading delete
//! - `hook` — collaborator interface notified of deleted nodes and leaves
//! - `view` — nested tree rendering and subtree export
//! - `error` — the engine's [`TreeError`]

pub mod algorithms;
pub mod engine;
pub mod error;
pub mod hook;
pub mod view;

pub use algorithms::{Ancestry, TreeWalker};
pub use engine::{DeleteReport, MutationEngine};
pub use error::TreeError;
pub use hook::DeleteHook;
pub use view::{ExportEntry, SubtreeExport, TreeView};
