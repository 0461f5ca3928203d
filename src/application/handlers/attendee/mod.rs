//! Attendee command and query handlers.

mod get_profile;
mod set_availability;
mod update_profile;
mod verify_access;

pub(crate) use get_profile::find_event;
pub use get_profile::{AttendeeProfileView, GetProfileHandler, GetProfileQuery};
pub use set_availability::{SetAvailabilityCommand, SetAvailabilityHandler, SetAvailabilityResult};
pub use update_profile::{UpdateProfileCommand, UpdateProfileHandler, UpdateProfileResult};
pub use verify_access::{VerifyAccessHandler, VerifyAccessResult};
