//! # canopy-core
//!
//! Core crate for Canopy. Contains configuration schemas, typed
//! identifiers, domain events, and the unified error system shared by
//! the node store, the mutation engine, and the access resolver.
//!
//! This crate has **no** internal dependencies on other Canopy crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
