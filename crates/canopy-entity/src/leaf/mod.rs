//! Leaf resource entities.

pub mod model;

pub use model::LeafResource;
