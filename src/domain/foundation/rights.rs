//! Access rights a broker grants to a provider for one service.
//!
//! Rights are a map from [`AccessRight`] to the [`AccessType`] the broker
//! assigned. A right that is absent from the map is treated as not granted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Operation a provider may perform on a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessRight {
    Query,
    Create,
    Update,
    Delete,
    Provide,
    Subscribe,
    AdminDirective,
}

impl fmt::Display for AccessRight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessRight::Query => "QUERY",
            AccessRight::Create => "CREATE",
            AccessRight::Update => "UPDATE",
            AccessRight::Delete => "DELETE",
            AccessRight::Provide => "PROVIDE",
            AccessRight::Subscribe => "SUBSCRIBE",
            AccessRight::AdminDirective => "ADMIN_DIRECTIVE",
        };
        write!(f, "{}", s)
    }
}

/// State the broker assigned to a right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    Approved,
    Rejected,
    Supported,
    Suggested,
}

/// Rights descriptor for one (service, zone, context) registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRights {
    rights: HashMap<AccessRight, AccessType>,
}

impl ServiceRights {
    /// Creates an empty descriptor (nothing granted).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access type for a right, replacing any previous value.
    pub fn with_right(mut self, right: AccessRight, access_type: AccessType) -> Self {
        self.rights.insert(right, access_type);
        self
    }

    /// Returns the access type recorded for a right, if any.
    pub fn access_type(&self, right: AccessRight) -> Option<AccessType> {
        self.rights.get(&right).copied()
    }

    /// True if the right is present with exactly the given access type.
    pub fn has_right(&self, right: AccessRight, access_type: AccessType) -> bool {
        self.access_type(right) == Some(access_type)
    }
}
