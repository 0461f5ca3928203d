//! Networking request command handlers.

mod cancel_request;
mod request_slot;
mod respond_to_request;

pub use cancel_request::{CancelRequestCommand, CancelRequestHandler, CancelRequestResult};
pub use request_slot::{RequestSlotCommand, RequestSlotHandler, RequestSlotResult};
pub use respond_to_request::{
    Decision, RespondToRequestCommand, RespondToRequestHandler, RespondToRequestResult,
};
