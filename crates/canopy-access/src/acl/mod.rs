//! Grant lookup and effective access resolution with container inheritance.

pub mod checker;
pub mod inheritance;
pub mod resolver;

pub use checker::GrantChecker;
pub use inheritance::{GrantLayer, InheritanceWalker};
pub use resolver::{AccessResolver, AccessSource, EffectiveAccess, PrincipalAccess};
