//! AccessGate port - may a destination receive an event?

use crate::domain::broadcast::{Destination, EventAction};

/// Yes/no authorization decision for event delivery.
///
/// Implementations must be free of side effects; the engine may call this
/// once per (batch, destination) pair.
pub trait AccessGate: Send + Sync {
    /// Returns true if `destination` may receive an event with `action`.
    fn is_authorized(&self, destination: &Destination, action: EventAction) -> bool;
}
