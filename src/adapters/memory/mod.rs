//! In-memory storage backend.
//!
//! Implements every storage port in one process-local store. Selected with
//! `storage.backend = "memory"` and used by the integration tests.

mod seed;
mod store;

pub use seed::{SeedAttendee, SeedError, SeedEvent, SeedFile, SeedSummary, SeedWindow};
pub use store::InMemoryNetworkingStore;
