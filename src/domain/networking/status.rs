//! Networking request lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a networking request.
///
/// ```text
/// pending ──► accepted
///    │
///    ├──────► rejected
///    │
///    └──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    /// Pending and accepted requests hold a slot; the others are history.
    pub fn holds_slot(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Accepted)
    }
}

impl StateMachine for RequestStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RequestStatus::*;
        matches!(
            (self, target),
            (Pending, Accepted) | (Pending, Rejected) | (Pending, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RequestStatus::*;
        match self {
            Pending => vec![Accepted, Rejected, Cancelled],
            Accepted | Rejected | Cancelled => vec![],
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown request status '{}'", other),
            )),
        }
    }
}
