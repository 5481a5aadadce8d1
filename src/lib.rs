//! Interop Broadcast - publishes change events to brokered destinations.
//!
//! A producer hands over batches of change events; the engine fans each
//! batch out to every destination registered for the producer's object
//! type, skipping destinations that lack the approved provide right, and
//! reports attempted/failed totals per run.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
