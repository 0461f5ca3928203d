//! EventPublisher port - Interface for publishing domain events.
//!
//! Handlers publish after their unit of work has committed, so a publish
//! failure never rolls back ledger state.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish events in order. Adapters without batching publish one by one.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
