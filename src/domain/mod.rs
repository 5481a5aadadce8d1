//! Domain layer containing broadcast value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, rights, errors, state machine)
//! - `broadcast` - Event batches, destinations, connectivity and run accounting

pub mod broadcast;
pub mod foundation;
