//! Broadcast orchestration.

mod engine;
mod in_flight;
mod leased_source;

pub use engine::BroadcastEngine;
