//! SessionResolver backed by a ConnectivityProvider.
//!
//! Maps the tagged connectivity onto "session or nothing". Event delivery
//! is only defined for brokered environments, so direct connectivity is
//! logged as an error rather than passed over quietly.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::broadcast::{Connectivity, Destination, ObjectTypeKey, Session};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ConnectivityProvider, SessionResolver};

pub struct ConnectivitySessionResolver {
    connectivity: Arc<dyn ConnectivityProvider>,
}

impl ConnectivitySessionResolver {
    pub fn new(connectivity: Arc<dyn ConnectivityProvider>) -> Self {
        Self { connectivity }
    }
}

#[async_trait]
impl SessionResolver for ConnectivitySessionResolver {
    async fn resolve_session(&self) -> Option<Arc<Session>> {
        let connectivity = self.connectivity.current();
        let mode = connectivity.mode();
        let err = match connectivity {
            Connectivity::Brokered(session) => return Some(session),
            Connectivity::Direct => DomainError::new(
                ErrorCode::UnsupportedConnectivity,
                "Events are only supported for brokered environments; this provider is connected directly",
            ),
            Connectivity::Unestablished => DomainError::new(
                ErrorCode::SessionUnavailable,
                "Not connected to an environment; no active session",
            ),
        };
        tracing::error!(code = %err.code, %mode, "{}", err.message);
        None
    }

    async fn destinations_for(
        &self,
        session: &Session,
        key: &ObjectTypeKey,
    ) -> Result<Vec<Destination>, DomainError> {
        Ok(session.destinations_for(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::StaticConnectivity;
    use crate::domain::broadcast::ServiceInfo;
    use crate::domain::foundation::{ContextId, ServiceRights, ZoneId};
    use std::io;
    use std::sync::Mutex;
    use tracing::subscriber::DefaultGuard;

    /// Formatted log output collected from the current thread.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn install() -> (Self, DefaultGuard) {
            let logs = Self::default();
            let writer = logs.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::TRACE)
                .finish();
            (logs, tracing::subscriber::set_default(subscriber))
        }

        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session() -> Arc<Session> {
        Arc::new(
            Session::new(
                "token-1",
                vec![ServiceInfo {
                    key: ObjectTypeKey::object("Students"),
                    destination: Destination::new(
                        ZoneId::new("z1").unwrap(),
                        ContextId::default(),
                        ServiceRights::new(),
                    ),
                }],
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn brokered_connectivity_yields_session() {
        let connectivity = Arc::new(StaticConnectivity::brokered(session()));
        let resolver = ConnectivitySessionResolver::new(connectivity);
        let resolved = resolver.resolve_session().await.unwrap();
        assert_eq!(resolved.token(), "token-1");
    }

    #[tokio::test]
    async fn direct_connectivity_yields_none() {
        let resolver =
            ConnectivitySessionResolver::new(Arc::new(StaticConnectivity::new(Connectivity::Direct)));
        assert!(resolver.resolve_session().await.is_none());
    }

    #[tokio::test]
    async fn direct_connectivity_is_logged_as_error() {
        let (logs, _guard) = CapturedLogs::install();
        let resolver =
            ConnectivitySessionResolver::new(Arc::new(StaticConnectivity::new(Connectivity::Direct)));

        assert!(resolver.resolve_session().await.is_none());

        let output = logs.contents();
        assert!(output.contains("ERROR"), "log output: {output}");
        assert!(output.contains("UNSUPPORTED_CONNECTIVITY"), "log output: {output}");
        assert!(output.contains("DIRECT"), "log output: {output}");
    }

    #[tokio::test]
    async fn unestablished_connectivity_is_logged_as_error() {
        let (logs, _guard) = CapturedLogs::install();
        let resolver = ConnectivitySessionResolver::new(Arc::new(StaticConnectivity::default()));

        assert!(resolver.resolve_session().await.is_none());

        let output = logs.contents();
        assert!(output.contains("ERROR"), "log output: {output}");
        assert!(output.contains("SESSION_UNAVAILABLE"), "log output: {output}");
    }

    #[tokio::test]
    async fn brokered_connectivity_logs_no_error() {
        let (logs, _guard) = CapturedLogs::install();
        let resolver = ConnectivitySessionResolver::new(Arc::new(StaticConnectivity::brokered(session())));

        assert!(resolver.resolve_session().await.is_some());
        assert!(!logs.contents().contains("ERROR"));
    }

    #[tokio::test]
    async fn unestablished_connectivity_yields_none() {
        let resolver = ConnectivitySessionResolver::new(Arc::new(StaticConnectivity::default()));
        assert!(resolver.resolve_session().await.is_none());
    }

    #[tokio::test]
    async fn destinations_come_from_session_registry() {
        let resolver = ConnectivitySessionResolver::new(Arc::new(StaticConnectivity::default()));
        let found = resolver
            .destinations_for(&session(), &ObjectTypeKey::object("Students"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let none = resolver
            .destinations_for(&session(), &ObjectTypeKey::object("Rooms"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
