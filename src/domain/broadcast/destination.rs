//! Subscribing endpoints and the service key they are registered under.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ContextId, ServiceRights, ZoneId};

/// Classification of a service in the broker's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    #[default]
    Object,
    Functional,
    Utility,
    ServicePath,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceType::Object => "OBJECT",
            ServiceType::Functional => "FUNCTIONAL",
            ServiceType::Utility => "UTILITY",
            ServiceType::ServicePath => "SERVICEPATH",
        };
        write!(f, "{}", s)
    }
}

/// Key under which destinations are registered for an object type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectTypeKey {
    pub service_name: String,
    pub service_type: ServiceType,
}

impl ObjectTypeKey {
    /// Key for a plain object service, the usual case for event providers.
    pub fn object(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_type: ServiceType::Object,
        }
    }
}

impl fmt::Display for ObjectTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_type, self.service_name)
    }
}

/// One event-delivery target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub zone: ZoneId,
    pub context: ContextId,
    pub rights: ServiceRights,
}

impl Destination {
    pub fn new(zone: ZoneId, context: ContextId, rights: ServiceRights) -> Self {
        Self {
            zone,
            context,
            rights,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone, self.context)
    }
}
