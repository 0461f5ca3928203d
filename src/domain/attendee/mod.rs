//! Attendee module - profiles, access codes and declared availability.

mod access_code;
mod aggregate;
mod events;

pub use access_code::{AccessCode, AccessCodeDigest, ACCESS_CODE_LEN};
pub use aggregate::{Attendee, AttendeeProfile, ProfileChanges, MAX_BIO_LENGTH, MAX_NAME_LENGTH};
pub use events::{AccessCodeVerified, AvailabilityUpdated, ProfileUpdated};
