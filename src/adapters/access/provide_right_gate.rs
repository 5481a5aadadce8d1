//! Default authorization policy: PROVIDE must be APPROVED.
//!
//! The event action is accepted but not consulted. Mapping CREATE/UPDATE/
//! DELETE onto the matching access rights was considered and is deliberately
//! not enabled; changing that is a product decision, not a code fix.

use crate::domain::broadcast::{Destination, EventAction};
use crate::domain::foundation::{AccessRight, AccessType};
use crate::ports::AccessGate;

/// Grants delivery to destinations whose PROVIDE right is APPROVED.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvideRightGate;

impl ProvideRightGate {
    pub fn new() -> Self {
        Self
    }
}

impl AccessGate for ProvideRightGate {
    fn is_authorized(&self, destination: &Destination, _action: EventAction) -> bool {
        destination
            .rights
            .has_right(AccessRight::Provide, AccessType::Approved)
    }
}
