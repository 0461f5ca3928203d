//! Networking module - the request ledger and its per-attendee projections.

mod errors;
mod events;
mod ledger;
mod projection;
mod request;
mod status;

pub use errors::NetworkingError;
pub use events::{RequestAccepted, RequestCancelled, RequestCreated, RequestRejected};
pub use ledger::{LedgerChange, SlotLedger};
pub use projection::{CounterpartView, NetworkingOverview, RequestView};
pub use request::{NetworkingRequest, PartyRole, MAX_MESSAGE_LENGTH};
pub use status::RequestStatus;
