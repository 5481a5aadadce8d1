//! Broadcast module - Events, destinations, sessions and run accounting.

mod connectivity;
mod destination;
mod event;
mod failure;
mod result;
mod run_state;

pub use connectivity::{Connectivity, ConnectivityMode, ServiceInfo, Session};
pub use destination::{Destination, ObjectTypeKey, ServiceType};
pub use event::{EventAction, EventBatch};
pub use failure::{BroadcastFailure, Severity, Unavailable};
pub use result::{BroadcastResult, BroadcastSummary};
pub use run_state::BroadcastState;
