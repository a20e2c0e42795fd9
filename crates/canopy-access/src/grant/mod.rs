//! Grant management.

pub mod cleanup;
pub mod service;

pub use cleanup::GrantCleanup;
pub use service::GrantService;
