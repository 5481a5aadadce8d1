//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the broadcast engine and the outside world. Adapters implement these ports.
//!
//! ## Producer Ports
//!
//! - `EventProvider` - Capability interface of a concrete event producer
//! - `EventSource` - Lazy, releasable batch iterator opened per run
//!
//! ## Delivery Ports
//!
//! - `AccessGate` - Authorization decision per destination
//! - `Publisher` - Sends one batch to one destination, never raises
//! - `EventTransport` - Wire-level event client wrapped by publishers
//!
//! ## Connectivity Ports
//!
//! - `ConnectivityProvider` - Current connectivity mode and session
//! - `SessionResolver` - Session and destination lookup for a run

mod access_gate;
mod event_source;
mod publisher;
mod session_resolver;
mod transport;

pub use access_gate::AccessGate;
pub use event_source::{EventProvider, EventSource};
pub use publisher::{DispatchOutcome, Publisher};
pub use session_resolver::{ConnectivityProvider, SessionResolver};
pub use transport::{EventTransport, TransportResponse};
