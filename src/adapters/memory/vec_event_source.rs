//! Event source and provider over an in-memory list of events.
//!
//! Events are split into batches lazily: each `next_batch` call takes at
//! most `max_size` objects off the front of the current event, so one large
//! event becomes several batches with the same action.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::broadcast::{EventBatch, ObjectTypeKey};
use crate::domain::foundation::{ContextId, DomainError, ZoneId};
use crate::ports::{EventProvider, EventSource};

pub struct VecEventSource {
    pending: VecDeque<EventBatch>,
    releases: Arc<AtomicUsize>,
    released: bool,
}

impl VecEventSource {
    pub fn new(events: Vec<EventBatch>) -> Self {
        Self {
            pending: events.into(),
            releases: Arc::new(AtomicUsize::new(0)),
            released: false,
        }
    }

    /// Shares a counter bumped on every `release` call.
    pub fn with_release_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.releases = counter;
        self
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for VecEventSource {
    fn has_more(&mut self) -> bool {
        !self.released && !self.pending.is_empty()
    }

    async fn next_batch(
        &mut self,
        max_size: NonZeroUsize,
    ) -> Result<Option<EventBatch>, DomainError> {
        let Some(front) = self.pending.front_mut() else {
            return Ok(None);
        };
        if front.size() <= max_size.get() {
            return Ok(self.pending.pop_front());
        }
        Ok(Some(front.take_front(max_size.get())))
    }

    fn release(&mut self) {
        self.pending.clear();
        self.released = true;
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// A dispatch failure reported back to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedDispatch {
    pub batch: EventBatch,
    pub zone: ZoneId,
    pub context: ContextId,
}

/// Provider that opens a fresh [`VecEventSource`] over the same events on
/// every run and remembers failures handed back to it.
pub struct InMemoryEventProvider {
    name: String,
    key: ObjectTypeKey,
    events: Vec<EventBatch>,
    max_objects: Option<NonZeroUsize>,
    opens: AtomicUsize,
    releases: Arc<AtomicUsize>,
    failures: Mutex<Vec<FailedDispatch>>,
}

impl InMemoryEventProvider {
    pub fn new(name: impl Into<String>, key: ObjectTypeKey, events: Vec<EventBatch>) -> Self {
        Self {
            name: name.into(),
            key,
            events,
            max_objects: None,
            opens: AtomicUsize::new(0),
            releases: Arc::new(AtomicUsize::new(0)),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the configured batch size for this provider.
    pub fn with_max_objects(mut self, max: NonZeroUsize) -> Self {
        self.max_objects = Some(max);
        self
    }

    /// Number of sources opened so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of sources released so far.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Failures reported through `on_dispatch_failure`, in call order.
    pub fn failed_dispatches(&self) -> Vec<FailedDispatch> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EventProvider for InMemoryEventProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn object_type(&self) -> ObjectTypeKey {
        self.key.clone()
    }

    fn max_objects_per_event(&self) -> Option<NonZeroUsize> {
        self.max_objects
    }

    async fn open_source(&self) -> Result<Option<Box<dyn EventSource>>, DomainError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.events.is_empty() {
            return Ok(None);
        }
        let source = VecEventSource::new(self.events.clone())
            .with_release_counter(Arc::clone(&self.releases));
        Ok(Some(Box::new(source)))
    }

    fn on_dispatch_failure(&self, batch: &EventBatch, zone: &ZoneId, context: &ContextId) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FailedDispatch {
                batch: batch.clone(),
                zone: zone.clone(),
                context: context.clone(),
            });
    }
}
