//! Session ports - current connectivity and the destinations it exposes.
//!
//! The engine takes a [`SessionResolver`] explicitly; there is no ambient
//! environment lookup. [`ConnectivityProvider`] is the narrower contract a
//! connection manager implements, and the bundled
//! `ConnectivitySessionResolver` adapter turns one into the other.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::broadcast::{Connectivity, Destination, ObjectTypeKey, Session};
use crate::domain::foundation::DomainError;

/// Exposes the current connectivity of this provider's environment.
pub trait ConnectivityProvider: Send + Sync {
    fn current(&self) -> Connectivity;
}

/// Port for resolving the session a broadcast run delivers through.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Returns the active brokered session, or `None` (with the reason
    /// already logged) when event delivery is not possible.
    async fn resolve_session(&self) -> Option<Arc<Session>>;

    /// Destinations registered for `key` in `session`, in registry order.
    ///
    /// An empty list means nobody subscribed; `Err` means the lookup itself
    /// failed.
    async fn destinations_for(
        &self,
        session: &Session,
        key: &ObjectTypeKey,
    ) -> Result<Vec<Destination>, DomainError>;
}
