//! Application layer - Commands, Queries, and Handlers.
//!
//! Handlers orchestrate domain operations over the ports. Command handlers
//! (write) go through `LedgerRepository`; query handlers (read) go through
//! `DirectoryReader`.

pub mod handlers;

pub use handlers::{
    // Attendee handlers
    AttendeeProfileView, GetProfileHandler, GetProfileQuery,
    SetAvailabilityCommand, SetAvailabilityHandler, SetAvailabilityResult,
    UpdateProfileCommand, UpdateProfileHandler, UpdateProfileResult,
    VerifyAccessHandler, VerifyAccessResult,
    // Directory handlers
    DirectoryEntry, DirectoryView, GetDirectoryHandler, GetDirectoryQuery,
    // Networking handlers
    CancelRequestCommand, CancelRequestHandler, CancelRequestResult, Decision,
    RequestSlotCommand, RequestSlotHandler, RequestSlotResult,
    RespondToRequestCommand, RespondToRequestHandler, RespondToRequestResult,
};
