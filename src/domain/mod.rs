//! Domain layer - pure business logic with no infrastructure dependencies.

pub mod attendee;
pub mod event;
pub mod foundation;
pub mod networking;
