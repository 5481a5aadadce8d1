//! Scoped ownership of an event source for one run.
//!
//! The engine releases the source explicitly when it reaches Finalizing.
//! If the run future is dropped or unwinds first, `Drop` releases it
//! instead. Either way `EventSource::release` runs exactly once.

use std::num::NonZeroUsize;

use crate::domain::broadcast::EventBatch;
use crate::domain::foundation::DomainError;
use crate::ports::EventSource;

pub(crate) struct LeasedSource {
    source: Option<Box<dyn EventSource>>,
}

impl LeasedSource {
    pub(crate) fn new(source: Box<dyn EventSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    pub(crate) fn has_more(&mut self) -> bool {
        self.source.as_mut().is_some_and(|s| s.has_more())
    }

    pub(crate) async fn next_batch(
        &mut self,
        max_size: NonZeroUsize,
    ) -> Result<Option<EventBatch>, DomainError> {
        match self.source.as_mut() {
            Some(source) => source.next_batch(max_size).await,
            None => Ok(None),
        }
    }

    /// Releases the source. Consumes the lease so it cannot be reused.
    pub(crate) fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
        }
    }
}

impl Drop for LeasedSource {
    fn drop(&mut self) {
        if self.source.is_some() {
            tracing::warn!("Event source abandoned before finalization; releasing");
            self.release();
        }
    }
}
