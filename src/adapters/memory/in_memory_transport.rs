//! In-memory event transport.
//!
//! Records every send for assertions and can be told to reject or fail
//! sends to particular zones. Nothing leaves the process.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use crate::domain::broadcast::EventBatch;
use crate::domain::foundation::{ContextId, DomainError, ErrorCode, ZoneId};
use crate::ports::{EventTransport, TransportResponse};

/// One recorded send.
#[derive(Debug, Clone, PartialEq)]
pub struct SentEvent {
    pub zone: ZoneId,
    pub context: ContextId,
    pub batch: EventBatch,
}

#[derive(Debug, Default)]
pub struct InMemoryTransport {
    sent: RwLock<Vec<SentEvent>>,
    rejecting: RwLock<HashSet<ZoneId>>,
    unreachable: RwLock<HashSet<ZoneId>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends to `zone` get an error response from the "broker".
    pub fn reject_zone(&self, zone: ZoneId) {
        self.rejecting
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(zone);
    }

    /// Sends to `zone` fail before reaching the "broker".
    pub fn make_unreachable(&self, zone: ZoneId) {
        self.unreachable
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(zone);
    }

    // === Test Helpers ===

    /// Every send call, in call order, whatever its outcome.
    pub fn sent(&self) -> Vec<SentEvent> {
        self.sent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Batches sent to `zone`, in call order.
    pub fn sent_to(&self, zone: &ZoneId) -> Vec<EventBatch> {
        self.sent()
            .into_iter()
            .filter(|s| &s.zone == zone)
            .map(|s| s.batch)
            .collect()
    }

    pub fn send_count(&self) -> usize {
        self.sent.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl EventTransport for InMemoryTransport {
    async fn send_events(
        &self,
        batch: &EventBatch,
        zone: &ZoneId,
        context: &ContextId,
    ) -> Result<TransportResponse, DomainError> {
        self.sent
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentEvent {
                zone: zone.clone(),
                context: context.clone(),
                batch: batch.clone(),
            });

        let unreachable = self
            .unreachable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(zone);
        if unreachable {
            return Err(DomainError::new(
                ErrorCode::TransportFailure,
                format!("zone {} unreachable", zone),
            ));
        }

        let rejected = self
            .rejecting
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(zone);
        if rejected {
            return Ok(TransportResponse::error(503, format!("zone {} rejected event", zone)));
        }

        Ok(TransportResponse::ok(202))
    }
}
