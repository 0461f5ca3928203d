//! Networking-specific error types.

use crate::domain::foundation::{
    AttendeeId, AuthError, DomainError, ErrorCode, RequestId, ValidationError,
};

use super::RequestStatus;

/// Errors raised by slot directory and request ledger operations.
///
/// None of these are retryable; the caller has to change the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkingError {
    /// Malformed input.
    ValidationFailed { field: String, message: String },
    /// Slot token not part of the event.
    InvalidSlot(String),
    /// Credential could not be resolved.
    Unauthorized(AuthError),
    /// Caller is neither requester nor target.
    Forbidden,
    /// Slot is taken, or the target is not available at it.
    SlotUnavailable { slot: String, reason: String },
    /// Same requester, target and slot already pending or accepted.
    DuplicateRequest { slot: String },
    /// Status change not allowed from the current state or by this party.
    InvalidTransition(String),
    EventNotFound(String),
    AttendeeNotFound(String),
    RequestNotFound(String),
    /// Storage or other infrastructure failure.
    Infrastructure(String),
}

impl NetworkingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        NetworkingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn invalid_slot(slot: impl Into<String>) -> Self {
        NetworkingError::InvalidSlot(slot.into())
    }
    pub fn slot_unavailable(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        NetworkingError::SlotUnavailable {
            slot: slot.into(),
            reason: reason.into(),
        }
    }
    pub fn duplicate(slot: impl Into<String>) -> Self {
        NetworkingError::DuplicateRequest { slot: slot.into() }
    }
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        NetworkingError::InvalidTransition(message.into())
    }
    pub fn cannot_transition(from: RequestStatus, to: RequestStatus) -> Self {
        NetworkingError::InvalidTransition(format!(
            "request is {} and cannot become {}",
            from, to
        ))
    }
    pub fn attendee_not_found(id: &AttendeeId) -> Self {
        NetworkingError::AttendeeNotFound(id.to_string())
    }
    pub fn request_not_found(id: &RequestId) -> Self {
        NetworkingError::RequestNotFound(id.to_string())
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        NetworkingError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            NetworkingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            NetworkingError::InvalidSlot(_) => ErrorCode::InvalidSlot,
            NetworkingError::Unauthorized(_) => ErrorCode::Unauthorized,
            NetworkingError::Forbidden => ErrorCode::Forbidden,
            NetworkingError::SlotUnavailable { .. } => ErrorCode::SlotUnavailable,
            NetworkingError::DuplicateRequest { .. } => ErrorCode::DuplicateRequest,
            NetworkingError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            NetworkingError::EventNotFound(_) => ErrorCode::EventNotFound,
            NetworkingError::AttendeeNotFound(_) => ErrorCode::AttendeeNotFound,
            NetworkingError::RequestNotFound(_) => ErrorCode::RequestNotFound,
            NetworkingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            NetworkingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            NetworkingError::InvalidSlot(slot) => {
                format!("'{}' is not a networking slot of this event", slot)
            }
            NetworkingError::Unauthorized(err) => err.to_string(),
            NetworkingError::Forbidden => "Not a party to this request".to_string(),
            NetworkingError::SlotUnavailable { slot, reason } => {
                format!("Slot {} is unavailable: {}", slot, reason)
            }
            NetworkingError::DuplicateRequest { slot } => {
                format!("A request for slot {} already exists", slot)
            }
            NetworkingError::InvalidTransition(msg) => format!("Invalid transition: {}", msg),
            NetworkingError::EventNotFound(code) => format!("Event not found: {}", code),
            NetworkingError::AttendeeNotFound(id) => format!("Attendee not found: {}", id),
            NetworkingError::RequestNotFound(id) => format!("Request not found: {}", id),
            NetworkingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for NetworkingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for NetworkingError {}

impl From<AuthError> for NetworkingError {
    fn from(err: AuthError) -> Self {
        NetworkingError::Unauthorized(err)
    }
}

impl From<ValidationError> for NetworkingError {
    fn from(err: ValidationError) -> Self {
        NetworkingError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for NetworkingError {
    fn from(err: DomainError) -> Self {
        let detail = |key: &str| err.details.get(key).cloned();
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                NetworkingError::ValidationFailed {
                    field: detail("field").unwrap_or_else(|| "unknown".to_string()),
                    message: err.message,
                }
            }
            ErrorCode::InvalidSlot => {
                NetworkingError::invalid_slot(detail("slot").unwrap_or(err.message))
            }
            ErrorCode::SlotUnavailable => NetworkingError::SlotUnavailable {
                slot: detail("slot").unwrap_or_default(),
                reason: err.message,
            },
            ErrorCode::DuplicateRequest => NetworkingError::DuplicateRequest {
                slot: detail("slot").unwrap_or_default(),
            },
            ErrorCode::InvalidStateTransition => NetworkingError::InvalidTransition(err.message),
            ErrorCode::EventNotFound => NetworkingError::EventNotFound(err.message),
            ErrorCode::AttendeeNotFound => NetworkingError::AttendeeNotFound(err.message),
            // Inactive events are indistinguishable from unknown credentials.
            ErrorCode::EventInactive | ErrorCode::Unauthorized => {
                NetworkingError::Unauthorized(AuthError::InvalidCredential)
            }
            ErrorCode::Forbidden => NetworkingError::Forbidden,
            ErrorCode::RequestNotFound => NetworkingError::RequestNotFound(err.message),
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                NetworkingError::Infrastructure(err.to_string())
            }
        }
    }
}
