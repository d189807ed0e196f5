//! Synthesis run lifecycle
//!
//! `Building -> Resolving -> Ordering -> Emitted`, with `Failed` reachable
//! from every non-terminal state. `Emitted` and `Failed` are terminal.

use crate::error::RunError;
use serde::{Deserialize, Serialize};

/// Phase of a synthesis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Nodes are being registered
    Building,
    /// References are being resolved; registration is closed
    Resolving,
    /// Resolved nodes are being sorted
    Ordering,
    /// The document has been produced
    Emitted,
    /// A phase failed; the run cannot continue
    Failed,
}

impl RunState {
    /// Whether no further transitions are possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }
}

/// Validates a run transition.
pub fn validate_transition(from: RunState, to: RunState) -> Result<(), RunError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(RunError::IllegalTransition { from, to })
    }
}

/// States reachable from `from` in one step
pub fn allowed_transitions(from: RunState) -> Vec<RunState> {
    use RunState::*;
    match from {
        Building => vec![Resolving, Failed],
        Resolving => vec![Ordering, Failed],
        Ordering => vec![Emitted, Failed],
        Emitted => vec![],
        Failed => vec![],
    }
}

fn allowed(from: RunState, to: RunState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(validate_transition(RunState::Building, RunState::Resolving).is_ok());
        assert!(validate_transition(RunState::Resolving, RunState::Ordering).is_ok());
        assert!(validate_transition(RunState::Ordering, RunState::Emitted).is_ok());
    }

    #[test]
    fn no_skipping_or_going_back() {
        assert!(validate_transition(RunState::Building, RunState::Emitted).is_err());
        assert!(validate_transition(RunState::Ordering, RunState::Building).is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(RunState::Emitted.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Building.is_terminal());
        assert_eq!(
            validate_transition(RunState::Failed, RunState::Building),
            Err(RunError::IllegalTransition {
                from: RunState::Failed,
                to: RunState::Building
            })
        );
    }
}
