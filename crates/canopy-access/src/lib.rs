//! # canopy-access
//!
//! Permission grants over the resource tree.
//!
//! ## Modules
//!
//! - `acl` — direct grant lookup, ancestor inheritance, and effective access resolution
//! - `grant` — share/revoke service and the delete hook that removes orphaned grants

pub mod acl;
pub mod grant;

pub use acl::{
    AccessResolver, AccessSource, EffectiveAccess, GrantChecker, GrantLayer, InheritanceWalker,
    PrincipalAccess,
};
pub use grant::{GrantCleanup, GrantService};
