//! In-memory store backends.

pub mod grant;
pub mod leaf;
pub mod node;

pub use grant::MemoryGrantStore;
pub use leaf::MemoryLeafStore;
pub use node::MemoryNodeStore;
