//! Domain events emitted by Canopy operations.
//!
//! Events are broadcast through [`EventPublisher`] and consumed by whatever
//! presentation or audit layer subscribes.

pub mod grant;
pub mod node;
pub mod publisher;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use grant::GrantEvent;
pub use node::NodeEvent;
pub use publisher::EventPublisher;

use crate::types::PrincipalId;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The principal who caused the event (if known).
    pub actor_id: Option<PrincipalId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A tree mutation.
    Node(NodeEvent),
    /// A grant change.
    Grant(GrantEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<PrincipalId>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
