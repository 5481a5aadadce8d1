//! EventSource and EventProvider ports - where broadcast events come from.
//!
//! An [`EventProvider`] is the capability interface a concrete producer
//! implements for one object type. Per run it opens a fresh
//! [`EventSource`]: a lazy, finite, non-restartable sequence of batches
//! that must be released once the run is done with it.

use async_trait::async_trait;
use std::num::NonZeroUsize;

use crate::domain::broadcast::{Destination, EventBatch, ObjectTypeKey};
use crate::domain::foundation::{ContextId, DomainError, ZoneId};

/// Lazy batch iterator over pending change events.
///
/// Implementations must ensure:
/// - `next_batch` is only called after `has_more` returned true
/// - batches are yielded in production order and never replayed
/// - `release` frees cursors, locks and buffers held by the producer
#[async_trait]
pub trait EventSource: Send {
    /// True while the producer still has batches to hand out.
    fn has_more(&mut self) -> bool;

    /// Produces the next batch of at most `max_size` objects.
    ///
    /// `Ok(None)` after `has_more` returned true signals that the producer
    /// ran dry unexpectedly. `Err` is a fault retrieving this one batch.
    async fn next_batch(
        &mut self,
        max_size: NonZeroUsize,
    ) -> Result<Option<EventBatch>, DomainError>;

    /// Releases producer-held resources. Called at most once per instance.
    fn release(&mut self);
}

/// Capability interface of a concrete event producer.
///
/// Only `provider_name`, `object_type` and `open_source` are required; the
/// hooks default to "publish unchanged" and "do nothing".
#[async_trait]
pub trait EventProvider: Send + Sync {
    /// Name used in logs and for per-provider configuration.
    fn provider_name(&self) -> &str;

    /// Object type whose destinations receive this provider's events.
    fn object_type(&self) -> ObjectTypeKey;

    /// Provider-specific batch size, taking precedence over configuration.
    fn max_objects_per_event(&self) -> Option<NonZeroUsize> {
        None
    }

    /// Opens a fresh source for this run.
    ///
    /// `Ok(None)` means there is nothing to publish right now.
    async fn open_source(&self) -> Result<Option<Box<dyn EventSource>>, DomainError>;

    /// Adjusts a batch for one destination before it is sent.
    ///
    /// Returning `None` skips the destination for this batch. Any change to
    /// the action is discarded by the engine.
    fn transform_for_destination(
        &self,
        batch: &EventBatch,
        _destination: &Destination,
    ) -> Option<EventBatch> {
        Some(batch.clone())
    }

    /// Called when dispatching `batch` to (`zone`, `context`) failed.
    fn on_dispatch_failure(&self, _batch: &EventBatch, _zone: &ZoneId, _context: &ContextId) {}
}
