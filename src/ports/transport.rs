//! EventTransport port - the wire-level event client.
//!
//! Serialization format, HTTP plumbing and retries live behind this trait.
//! The engine never talks to it directly; [`crate::ports::Publisher`]
//! implementations wrap it.

use async_trait::async_trait;

use crate::domain::broadcast::EventBatch;
use crate::domain::foundation::{ContextId, DomainError, ZoneId};

/// Response from the broker for one event message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub error: Option<String>,
}

impl TransportResponse {
    /// A successful response with the given status.
    pub fn ok(status: u16) -> Self {
        Self { status, error: None }
    }

    /// A response carrying an error description.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(message.into()),
        }
    }

    /// True if the broker reported an error or a non-2xx status.
    pub fn has_error(&self) -> bool {
        self.error.is_some() || !(200..300).contains(&self.status)
    }

    /// Human-readable description of the failure, if any.
    pub fn error_description(&self) -> Option<String> {
        match (&self.error, self.has_error()) {
            (Some(message), _) => Some(format!("status {}: {}", self.status, message)),
            (None, true) => Some(format!("status {}", self.status)),
            (None, false) => None,
        }
    }
}

/// Sends one event message to a (zone, context) through the broker.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn send_events(
        &self,
        batch: &EventBatch,
        zone: &ZoneId,
        context: &ContextId,
    ) -> Result<TransportResponse, DomainError>;
}
