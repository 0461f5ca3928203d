//! Access gate port.
//!
//! Resolves the credential pair an attendee presents on every call into an
//! identity scoped to one event. Adapters compare SHA-256 digests of the
//! access code and never see or store plaintext beyond the call.
//!
//! # Contract
//!
//! Unknown event code, inactive event and unknown access code all return
//! `AuthError::InvalidCredential`. Only storage failures return
//! `ServiceUnavailable`.

use async_trait::async_trait;

use crate::domain::attendee::AccessCode;
use crate::domain::event::EventCode;
use crate::domain::foundation::{AuthError, AuthenticatedAttendee};

#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn resolve(
        &self,
        event_code: &EventCode,
        access_code: &AccessCode,
    ) -> Result<AuthenticatedAttendee, AuthError>;
}
