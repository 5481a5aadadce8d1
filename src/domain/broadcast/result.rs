//! Run-scoped counters and the summary a run reports.

use serde::{Deserialize, Serialize};

use super::{BroadcastState, Unavailable};
use crate::domain::foundation::{RunId, Timestamp};

/// Mutable accumulator for one broadcast run.
///
/// Counters only ever grow. The engine owns the single instance for a run
/// and turns it into a [`BroadcastSummary`] when the run is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastResult {
    attempted: u64,
    failed: u64,
    batches: u64,
}

impl BroadcastResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a batch whose destination loop completed.
    pub fn record_batch(&mut self, size: usize) {
        self.attempted = self.attempted.saturating_add(size as u64);
        self.batches = self.batches.saturating_add(1);
    }

    /// Records a (batch, destination) pair that was denied or failed.
    pub fn record_failure(&mut self, size: usize) {
        self.failed = self.failed.saturating_add(size as u64);
    }

    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }
}

/// What a broadcast run reports to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastSummary {
    pub run_id: RunId,
    pub provider: String,
    /// Objects across every batch the source yielded.
    pub attempted: u64,
    /// Objects counted once per denied or failed (batch, destination) pair.
    pub failed: u64,
    pub batches: u64,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    /// Last working state before the run moved to `Done`.
    pub stopped_in: BroadcastState,
    /// Why the run ended before iterating a source, if it did.
    pub skipped: Option<Unavailable>,
}

impl BroadcastSummary {
    /// True if the run never got to iterate a source.
    pub fn is_noop(&self) -> bool {
        self.batches == 0 && self.attempted == 0 && self.failed == 0
    }

    /// True if the run was turned away because another run for the same
    /// provider name was still in flight.
    pub fn was_refused(&self) -> bool {
        self.skipped == Some(Unavailable::RunInFlight)
    }
}
