//! Publisher port - transport-agnostic send of one batch to one destination.

use async_trait::async_trait;
use std::fmt;

use crate::domain::broadcast::{Destination, EventBatch};

/// Result of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Delivered => None,
            DispatchOutcome::Failed(reason) => Some(reason),
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Delivered => write!(f, "delivered"),
            DispatchOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Port for delivering a batch to a destination.
///
/// Implementations must ensure:
/// - faults are returned as [`DispatchOutcome::Failed`], never propagated
/// - no retries happen here; retry policy belongs to the transport
/// - sends are bounded in time
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn send(&self, batch: &EventBatch, destination: &Destination) -> DispatchOutcome;
}
