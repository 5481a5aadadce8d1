//! Classification of everything that can go wrong during a run.
//!
//! None of these ever leave the engine as an `Err`. They exist so every
//! failure site logs with a consistent category and severity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Severity a failure is logged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// Why a run could not get as far as iterating a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailable {
    /// The session resolver returned nothing; it logs the cause.
    NoSession,
    NoDestinations,
    DestinationLookup,
    NoEvents,
    SourceConstruction,
    RunInFlight,
}

#[derive(Debug, Clone, Error)]
pub enum BroadcastFailure {
    #[error("resource unavailable ({kind:?}): {reason}")]
    ResourceUnavailable { kind: Unavailable, reason: String },

    #[error("dispatch to {destination} failed: {reason}")]
    TransportFailure { destination: String, reason: String },

    #[error("producer fault: {0}")]
    ProducerFault(String),

    #[error("{destination} lacks approved PROVIDE right")]
    AuthorizationDenial { destination: String },
}

impl BroadcastFailure {
    pub fn unavailable(kind: Unavailable, reason: impl Into<String>) -> Self {
        BroadcastFailure::ResourceUnavailable {
            kind,
            reason: reason.into(),
        }
    }

    /// Level this failure is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            BroadcastFailure::ResourceUnavailable { kind, .. } => match kind {
                Unavailable::NoSession | Unavailable::NoDestinations | Unavailable::NoEvents => {
                    Severity::Info
                }
                Unavailable::RunInFlight => Severity::Warn,
                Unavailable::DestinationLookup | Unavailable::SourceConstruction => Severity::Error,
            },
            BroadcastFailure::TransportFailure { .. } => Severity::Warn,
            BroadcastFailure::ProducerFault(_) => Severity::Error,
            BroadcastFailure::AuthorizationDenial { .. } => Severity::Debug,
        }
    }
}

impl From<DomainError> for BroadcastFailure {
    fn from(err: DomainError) -> Self {
        BroadcastFailure::ProducerFault(err.to_string())
    }
}
