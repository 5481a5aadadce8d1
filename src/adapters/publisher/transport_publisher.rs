//! TransportPublisher - Publisher backed by an EventTransport.
//!
//! Converts every way a send can go wrong into [`DispatchOutcome::Failed`]:
//!
//! | Transport result | Outcome |
//! |------------------|---------|
//! | `Ok` with 2xx, no error | `Delivered` |
//! | `Ok` with error or non-2xx | `Failed(status + message)` |
//! | `Err(DomainError)` | `Failed(error)` |
//! | exceeds `send_timeout` | `Failed([TRANSPORT_TIMEOUT] ...)` |
//! | panics | `Failed([INTERNAL_ERROR] transport panicked)` |

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BroadcastConfig;
use crate::domain::broadcast::{Destination, EventBatch};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{DispatchOutcome, EventTransport, Publisher};

/// Default bound on a single send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TransportPublisher {
    transport: Arc<dyn EventTransport>,
    send_timeout: Duration,
}

impl TransportPublisher {
    /// Create a publisher with the default send timeout.
    pub fn new(transport: Arc<dyn EventTransport>) -> Self {
        Self {
            transport,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Create a publisher using the configured send timeout.
    pub fn from_config(transport: Arc<dyn EventTransport>, config: &BroadcastConfig) -> Self {
        Self::new(transport).with_send_timeout(config.send_timeout())
    }

    /// Override the send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }
}

#[async_trait]
impl Publisher for TransportPublisher {
    async fn send(&self, batch: &EventBatch, destination: &Destination) -> DispatchOutcome {
        tracing::debug!(
            zone = %destination.zone,
            context = %destination.context,
            action = %batch.action(),
            objects = batch.size(),
            "Sending event"
        );

        let call = AssertUnwindSafe(self.transport.send_events(
            batch,
            &destination.zone,
            &destination.context,
        ))
        .catch_unwind();

        let outcome = match tokio::time::timeout(self.send_timeout, call).await {
            Err(_) => DispatchOutcome::Failed(
                DomainError::new(
                    ErrorCode::TransportTimeout,
                    format!("send timed out after {}ms", self.send_timeout.as_millis()),
                )
                .to_string(),
            ),
            Ok(Err(_)) => DispatchOutcome::Failed(
                DomainError::new(ErrorCode::InternalError, "transport panicked").to_string(),
            ),
            Ok(Ok(Err(e))) => DispatchOutcome::Failed(e.to_string()),
            Ok(Ok(Ok(response))) => match response.error_description() {
                Some(description) => DispatchOutcome::Failed(description),
                None => DispatchOutcome::Delivered,
            },
        };

        if let DispatchOutcome::Failed(reason) = &outcome {
            tracing::error!(
                zone = %destination.zone,
                context = %destination.context,
                "Failed to send event: {}",
                reason
            );
        }

        outcome
    }
}
