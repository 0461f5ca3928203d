//! Event module - the slot catalogue side of the slot directory.
//!
//! Events are created by the organiser back office; this crate reads them and
//! validates every slot token against them.

mod aggregate;
mod code;
mod slot;

pub use aggregate::{Event, MAX_NAME_LENGTH};
pub use code::EventCode;
pub use slot::{NetworkingWindow, TimeSlot, NETWORKING_OFFSET_MINUTES, SLOT_INTERVAL_MINUTES};
