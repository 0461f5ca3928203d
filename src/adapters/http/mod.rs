//! HTTP adapter - the public REST API.
//!
//! Attendees authenticate per call with `(event_code, access_code)`; there
//! are no sessions or cookies.

pub mod networking;
mod router;

pub use networking::{networking_routes, NetworkingAppState};
pub use router::build_router;
