//! Event Networking - slot coordination for live events.
//!
//! Attendees of an event propose short meetings to each other at fixed
//! networking slots. The service keeps the request ledger consistent: no
//! attendee ever holds two accepted meetings in the same slot, and accepting
//! one request settles every competing request for that slot.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
