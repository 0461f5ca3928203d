//! Adapters - Implementations of port interfaces.
//!
//! - `events` - event publishers (in-memory bus, tracing sink)
//! - `http` - axum REST API
//! - `memory` - process-local storage backend
//! - `postgres` - PostgreSQL storage backend

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;

pub use events::{InMemoryEventBus, TracingEventPublisher};
pub use self::http::{build_router, NetworkingAppState};
pub use memory::InMemoryNetworkingStore;
