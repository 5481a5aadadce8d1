//! Adapters - Implementations of port interfaces.
//!
//! - `access` - Access gate over destination rights
//! - `memory` - In-memory event provider and transport
//! - `publisher` - Publisher over an event transport
//! - `session` - Session resolution from connectivity state

pub mod access;
pub mod memory;
pub mod publisher;
pub mod session;

pub use access::ProvideRightGate;
pub use memory::{InMemoryEventProvider, InMemoryTransport, VecEventSource};
pub use publisher::TransportPublisher;
pub use session::{ConnectivitySessionResolver, StaticConnectivity};
