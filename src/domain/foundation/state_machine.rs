//! State machine trait for lifecycle enums.
//!
//! Gives every lifecycle enum the same validated-transition surface so
//! orchestration code never hand-rolls transition checks.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors declare their valid successors; validated transitions and
/// terminal detection come for free.
///
/// # Example
///
/// ```ignore
/// let next = BroadcastState::Idle.transition_to(BroadcastState::SessionResolved)?;
/// assert!(!next.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
