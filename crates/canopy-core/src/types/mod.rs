//! Core type definitions used across the Canopy workspace.

pub mod id;

pub use id::*;
