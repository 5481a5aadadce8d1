//! In-memory adapters.
//!
//! Deterministic, in-process implementations of the producer and transport
//! ports, used by tests and by embedders wiring the engine without a broker.
//!
//! - `InMemoryTransport` - Records sends, can reject or fail per zone
//! - `VecEventSource` - Lazily batches a list of events
//! - `InMemoryEventProvider` - Opens a fresh `VecEventSource` per run

mod in_memory_transport;
mod vec_event_source;

pub use in_memory_transport::{InMemoryTransport, SentEvent};
pub use vec_event_source::{FailedDispatch, InMemoryEventProvider, VecEventSource};
