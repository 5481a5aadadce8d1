//! Connectivity modes and the brokered session snapshot.
//!
//! A [`Session`] is a read-only view of what the broker told us when the
//! connection was established: a token plus every service registration
//! (object type, zone, context, rights) visible to this provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{Destination, ObjectTypeKey};
use crate::domain::foundation::{Timestamp, ValidationError};

/// One service registration known to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub key: ObjectTypeKey,
    pub destination: Destination,
}

/// Established brokered session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    established_at: Timestamp,
    services: Vec<ServiceInfo>,
}

impl Session {
    /// Creates a session snapshot, returning error if the token is empty.
    pub fn new(token: impl Into<String>, services: Vec<ServiceInfo>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::empty_field("session_token"));
        }
        Ok(Self {
            token,
            established_at: Timestamp::now(),
            services,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn established_at(&self) -> Timestamp {
        self.established_at
    }

    pub fn services(&self) -> &[ServiceInfo] {
        &self.services
    }

    /// Destinations registered for `key`, in registration order.
    pub fn destinations_for(&self, key: &ObjectTypeKey) -> Vec<Destination> {
        self.services
            .iter()
            .filter(|s| &s.key == key)
            .map(|s| s.destination.clone())
            .collect()
    }
}

/// Mode of the current connection, without the session payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityMode {
    Brokered,
    Direct,
    Unestablished,
}

impl fmt::Display for ConnectivityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectivityMode::Brokered => "BROKERED",
            ConnectivityMode::Direct => "DIRECT",
            ConnectivityMode::Unestablished => "UNESTABLISHED",
        };
        write!(f, "{}", s)
    }
}

/// Current connectivity, tagged by mode.
///
/// Only the brokered variant carries a session; event delivery is
/// undefined for the other two.
#[derive(Debug, Clone)]
pub enum Connectivity {
    Brokered(Arc<Session>),
    Direct,
    Unestablished,
}

impl Connectivity {
    pub fn mode(&self) -> ConnectivityMode {
        match self {
            Connectivity::Brokered(_) => ConnectivityMode::Brokered,
            Connectivity::Direct => ConnectivityMode::Direct,
            Connectivity::Unestablished => ConnectivityMode::Unestablished,
        }
    }
}
