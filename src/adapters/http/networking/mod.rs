//! HTTP adapter for attendee networking.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::{health, NetworkingAppState, REQUEST_ID_HEADER};
pub use routes::{networking_routes, EVENT_ROUTE_PREFIX};
