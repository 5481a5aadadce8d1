//! Application layer - orchestration over the ports.
//!
//! The engine depends only on port traits; concrete adapters are chosen
//! by whoever constructs it.

pub mod broadcast;

pub use broadcast::BroadcastEngine;
