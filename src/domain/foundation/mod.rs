//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, rights, and error types
//! that form the vocabulary of the broadcast domain.

mod errors;
mod ids;
mod rights;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ContextId, RunId, ZoneId};
pub use rights::{AccessRight, AccessType, ServiceRights};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
