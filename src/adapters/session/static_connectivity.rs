//! Connectivity provider holding a value set by the connection manager.
//!
//! The connection manager calls [`StaticConnectivity::set`] when it
//! connects or disconnects; resolvers read a snapshot per run.

use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::broadcast::{Connectivity, Session};
use crate::ports::ConnectivityProvider;

#[derive(Debug)]
pub struct StaticConnectivity {
    current: RwLock<Connectivity>,
}

impl StaticConnectivity {
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            current: RwLock::new(connectivity),
        }
    }

    /// Brokered connectivity with the given session.
    pub fn brokered(session: Arc<Session>) -> Self {
        Self::new(Connectivity::Brokered(session))
    }

    /// Replaces the current connectivity.
    pub fn set(&self, connectivity: Connectivity) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = connectivity;
    }
}

impl Default for StaticConnectivity {
    fn default() -> Self {
        Self::new(Connectivity::Unestablished)
    }
}

impl ConnectivityProvider for StaticConnectivity {
    fn current(&self) -> Connectivity {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
