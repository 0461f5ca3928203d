//! Ports - interfaces between the application core and infrastructure.
//!
//! - `LedgerRepository` / `LedgerTransaction` - serialized writes per event
//! - `DirectoryReader` - unlocked reads for projections
//! - `AccessGate` - access code to attendee identity
//! - `EventPublisher` - domain event sink

mod access_gate;
mod directory_reader;
mod event_publisher;
mod ledger_repository;

pub use access_gate::AccessGate;
pub use directory_reader::DirectoryReader;
pub use event_publisher::EventPublisher;
pub use ledger_repository::{LedgerRepository, LedgerTransaction};
