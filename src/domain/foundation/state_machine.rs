//! State machine trait for lifecycle status enums.

use super::ValidationError;

/// Status enums that move through a fixed set of transitions.
///
/// Implementors list the allowed edges; `transition_to` and `is_terminal`
/// come for free.
///
/// ```ignore
/// let next = RequestStatus::Pending.transition_to(RequestStatus::Accepted)?;
/// assert!(next.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if the edge `self -> target` exists.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns every state reachable in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs the transition, failing if the edge does not exist.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "status",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// A state with no outgoing edges.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Door {
        Closed,
        Open,
        Bricked,
    }

    impl StateMachine for Door {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Door::Closed => vec![Door::Open, Door::Bricked],
                Door::Open => vec![Door::Closed],
                Door::Bricked => vec![],
            }
        }
    }

    #[test]
    fn transition_to_follows_edges() {
        assert_eq!(Door::Closed.transition_to(Door::Open), Ok(Door::Open));
    }

    #[test]
    fn transition_to_rejects_missing_edge() {
        let err = Door::Open.transition_to(Door::Bricked).unwrap_err();
        assert_eq!(err.field(), "status");
    }

    #[test]
    fn terminal_state_has_no_edges() {
        assert!(Door::Bricked.is_terminal());
        assert!(!Door::Closed.is_terminal());
    }
}
