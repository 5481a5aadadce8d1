//! Lifecycle of a single broadcast run.
//!
//! ```text
//! Idle -> SessionResolved -> DestinationsResolved -> Iterating -> Finalizing -> Done
//!   \________________\______________________\___________________________/^
//! ```
//!
//! Every pre-iteration state may jump straight to `Done` (nothing to do).
//! `Iterating` always passes through `Finalizing` so the source is released.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastState {
    #[default]
    Idle,
    SessionResolved,
    DestinationsResolved,
    Iterating,
    Finalizing,
    Done,
}

impl StateMachine for BroadcastState {
    fn valid_transitions(&self) -> Vec<Self> {
        use BroadcastState::*;
        match self {
            Idle => vec![SessionResolved, Done],
            SessionResolved => vec![DestinationsResolved, Done],
            DestinationsResolved => vec![Iterating, Done],
            Iterating => vec![Finalizing],
            Finalizing => vec![Done],
            Done => vec![],
        }
    }
}

impl fmt::Display for BroadcastState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BroadcastState::Idle => "idle",
            BroadcastState::SessionResolved => "session_resolved",
            BroadcastState::DestinationsResolved => "destinations_resolved",
            BroadcastState::Iterating => "iterating",
            BroadcastState::Finalizing => "finalizing",
            BroadcastState::Done => "done",
        };
        write!(f, "{}", s)
    }
}
