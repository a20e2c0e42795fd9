//! Broadcast publisher for domain events.

use tokio::sync::broadcast;
use tracing::trace;

use super::DomainEvent;

/// Fan-out publisher backed by a `tokio` broadcast channel.
///
/// Publishing with no live subscribers is not an error; the event is dropped.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventPublisher {
    /// Create a publisher with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all subsequently published events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to current subscribers.
    pub fn publish(&self, event: DomainEvent) {
        match self.tx.send(event) {
            Ok(receivers) => trace!(receivers, "Published domain event"),
            Err(_) => trace!("Dropped domain event, no subscribers"),
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}
