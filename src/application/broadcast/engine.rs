//! BroadcastEngine - fans producer batches out to every authorized destination.
//!
//! A run walks `Idle -> SessionResolved -> DestinationsResolved -> Iterating
//! -> Finalizing -> Done`. Nothing escapes `broadcast` as an error: each
//! failure is classified, logged at its severity and folded into the
//! attempted/failed counters of the returned summary.

use futures::FutureExt;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::in_flight::InFlightRuns;
use super::leased_source::LeasedSource;
use crate::config::BroadcastConfig;
use crate::domain::broadcast::{
    BroadcastFailure, BroadcastResult, BroadcastState, BroadcastSummary, Destination,
    EventBatch, Severity, Unavailable,
};
use crate::domain::foundation::{DomainError, ErrorCode, RunId, StateMachine, Timestamp};
use crate::ports::{AccessGate, DispatchOutcome, EventProvider, Publisher, SessionResolver};

/// Orchestrates broadcast runs for any number of providers.
pub struct BroadcastEngine {
    session_resolver: Arc<dyn SessionResolver>,
    access_gate: Arc<dyn AccessGate>,
    publisher: Arc<dyn Publisher>,
    config: BroadcastConfig,
    in_flight: InFlightRuns,
}

impl BroadcastEngine {
    pub fn new(
        session_resolver: Arc<dyn SessionResolver>,
        access_gate: Arc<dyn AccessGate>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self::with_config(
            session_resolver,
            access_gate,
            publisher,
            BroadcastConfig::default(),
        )
    }

    pub fn with_config(
        session_resolver: Arc<dyn SessionResolver>,
        access_gate: Arc<dyn AccessGate>,
        publisher: Arc<dyn Publisher>,
        config: BroadcastConfig,
    ) -> Self {
        Self {
            session_resolver,
            access_gate,
            publisher,
            config,
            in_flight: InFlightRuns::default(),
        }
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// True while a run for `provider_name` has not yet returned.
    ///
    /// Runs are keyed by provider name, so two provider instances sharing a
    /// name share the single in-flight slot.
    pub fn is_running(&self, provider_name: &str) -> bool {
        self.in_flight.is_running(provider_name)
    }

    /// Publishes everything `provider` currently has pending.
    ///
    /// A call made while another run for the same provider name is in
    /// flight does nothing and returns a summary whose `was_refused()` is true.
    pub async fn broadcast(&self, provider: &dyn EventProvider) -> BroadcastSummary {
        let mut run = RunTracker::start(provider.provider_name());

        let Some(_guard) = self.in_flight.try_acquire(provider.provider_name()) else {
            run.report(&BroadcastFailure::unavailable(
                Unavailable::RunInFlight,
                "a run for this provider is already in progress",
            ));
            return run.finish();
        };

        self.run(provider, &mut run).await;
        run.finish()
    }

    async fn run(&self, provider: &dyn EventProvider, run: &mut RunTracker) {
        // 1. Session
        let Some(session) = self.session_resolver.resolve_session().await else {
            run.report(&BroadcastFailure::unavailable(
                Unavailable::NoSession,
                "no brokered session available",
            ));
            return;
        };
        run.advance(BroadcastState::SessionResolved);

        // 2. Destinations
        let key = provider.object_type();
        let destinations = match self.session_resolver.destinations_for(&session, &key).await {
            Ok(destinations) if destinations.is_empty() => {
                run.report(&BroadcastFailure::unavailable(
                    Unavailable::NoDestinations,
                    format!("no destinations registered for {}", key),
                ));
                return;
            }
            Ok(destinations) => destinations,
            Err(e) => {
                run.report(&BroadcastFailure::unavailable(
                    Unavailable::DestinationLookup,
                    e.to_string(),
                ));
                return;
            }
        };
        run.advance(BroadcastState::DestinationsResolved);
        debug!(
            run_id = %run.run_id,
            provider = %run.provider,
            object_type = %key,
            destinations = destinations.len(),
            "Destinations resolved"
        );

        // 3. Source
        let max_size = self.max_size_for(provider);
        let mut source = match provider.open_source().await {
            Ok(Some(source)) => LeasedSource::new(source),
            Ok(None) => {
                run.report(&BroadcastFailure::unavailable(
                    Unavailable::NoEvents,
                    "provider has no events to publish",
                ));
                return;
            }
            Err(e) => {
                run.report(&BroadcastFailure::unavailable(
                    Unavailable::SourceConstruction,
                    e.to_string(),
                ));
                return;
            }
        };
        run.advance(BroadcastState::Iterating);

        // 4. Iterate
        while source.has_more() {
            let fetched = AssertUnwindSafe(source.next_batch(max_size))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(DomainError::new(
                        ErrorCode::ProducerFault,
                        "source panicked while producing a batch",
                    ))
                });
            let batch = match fetched {
                Ok(Some(batch)) => batch,
                Ok(None) => {
                    run.report(&BroadcastFailure::ProducerFault(
                        "source reported more events but yielded none".to_string(),
                    ));
                    break;
                }
                Err(e) => {
                    run.report(&BroadcastFailure::from(e));
                    continue;
                }
            };

            self.publish_batch(provider, &batch, &destinations, run).await;
            run.result.record_batch(batch.size());
        }

        // 5. Release
        run.advance(BroadcastState::Finalizing);
        source.finish();
    }

    async fn publish_batch(
        &self,
        provider: &dyn EventProvider,
        batch: &EventBatch,
        destinations: &[Destination],
        run: &mut RunTracker,
    ) {
        let size = batch.size();
        let action = batch.action();

        for destination in destinations {
            if !self.access_gate.is_authorized(destination, action) {
                run.report(&BroadcastFailure::AuthorizationDenial {
                    destination: destination.to_string(),
                });
                run.result.record_failure(size);
                continue;
            }

            let Some(mut outgoing) = provider.transform_for_destination(batch, destination) else {
                debug!(
                    run_id = %run.run_id,
                    provider = %run.provider,
                    destination = %destination,
                    "Transform skipped destination for this batch"
                );
                continue;
            };
            if outgoing.restore_action(action) {
                warn!(
                    run_id = %run.run_id,
                    provider = %run.provider,
                    destination = %destination,
                    %action,
                    "Transform changed the event action; original restored"
                );
            }

            if let DispatchOutcome::Failed(reason) = self.publisher.send(&outgoing, destination).await {
                provider.on_dispatch_failure(&outgoing, &destination.zone, &destination.context);
                run.report(&BroadcastFailure::TransportFailure {
                    destination: destination.to_string(),
                    reason,
                });
                run.result.record_failure(size);
            }
        }
    }

    fn max_size_for(&self, provider: &dyn EventProvider) -> NonZeroUsize {
        provider
            .max_objects_per_event()
            .unwrap_or_else(|| self.config.max_objects_for(provider.provider_name()))
    }
}

/// Per-run state, counters and log context.
struct RunTracker {
    run_id: RunId,
    provider: String,
    state: BroadcastState,
    result: BroadcastResult,
    skipped: Option<Unavailable>,
    started_at: Timestamp,
}

impl RunTracker {
    fn start(provider: &str) -> Self {
        let tracker = Self {
            run_id: RunId::new(),
            provider: provider.to_string(),
            state: BroadcastState::Idle,
            result: BroadcastResult::new(),
            skipped: None,
            started_at: Timestamp::now(),
        };
        debug!(run_id = %tracker.run_id, provider = %tracker.provider, "Broadcast started");
        tracker
    }

    fn advance(&mut self, next: BroadcastState) {
        match self.state.transition_to(next) {
            Ok(state) => self.state = state,
            Err(e) => error!(
                run_id = %self.run_id,
                provider = %self.provider,
                from = %self.state,
                to = %next,
                error = %e,
                "Invalid broadcast state transition"
            ),
        }
    }

    fn report(&mut self, failure: &BroadcastFailure) {
        if let BroadcastFailure::ResourceUnavailable { kind, .. } = failure {
            self.skipped = Some(*kind);
        }
        let (run_id, provider, state) = (&self.run_id, &self.provider, &self.state);
        match failure.severity() {
            Severity::Debug => debug!(%run_id, %provider, %state, "{}", failure),
            Severity::Info => info!(%run_id, %provider, %state, "{}", failure),
            Severity::Warn => warn!(%run_id, %provider, %state, "{}", failure),
            Severity::Error => error!(%run_id, %provider, %state, "{}", failure),
        }
    }

    fn finish(mut self) -> BroadcastSummary {
        let stopped_in = self.state;
        self.advance(BroadcastState::Done);
        let summary = BroadcastSummary {
            run_id: self.run_id,
            provider: self.provider,
            attempted: self.result.attempted(),
            failed: self.result.failed(),
            batches: self.result.batches(),
            started_at: self.started_at,
            finished_at: Timestamp::now(),
            stopped_in,
            skipped: self.skipped,
        };
        info!(
            run_id = %summary.run_id,
            provider = %summary.provider,
            attempted = summary.attempted,
            failed = summary.failed,
            batches = summary.batches,
            elapsed_ms = summary
                .finished_at
                .duration_since(&summary.started_at)
                .num_milliseconds(),
            "Broadcast finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::access::ProvideRightGate;
    use crate::adapters::memory::InMemoryEventProvider;
    use crate::domain::broadcast::{EventAction, ObjectTypeKey, Session};
    use crate::domain::foundation::{
        AccessRight, AccessType, ContextId, ServiceRights, ZoneId,
    };
    use crate::ports::EventSource;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    // ─────────────────────────────────────────────────────────────────────
    // Mock implementations
    // ─────────────────────────────────────────────────────────────────────

    struct MockSessionResolver {
        session: Option<Arc<Session>>,
        destinations: Result<Vec<Destination>, DomainError>,
        lookups: AtomicUsize,
    }

    impl MockSessionResolver {
        fn with_destinations(destinations: Vec<Destination>) -> Self {
            Self {
                session: Some(Arc::new(Session::new("token-1", vec![]).unwrap())),
                destinations: Ok(destinations),
                lookups: AtomicUsize::new(0),
            }
        }

        fn without_session() -> Self {
            Self {
                session: None,
                ..Self::with_destinations(vec![])
            }
        }

        fn failing_lookup() -> Self {
            Self {
                destinations: Err(DomainError::new(
                    ErrorCode::DestinationLookupFailed,
                    "registry offline",
                )),
                ..Self::with_destinations(vec![])
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionResolver for MockSessionResolver {
        async fn resolve_session(&self) -> Option<Arc<Session>> {
            self.session.clone()
        }

        async fn destinations_for(
            &self,
            _session: &Session,
            _key: &ObjectTypeKey,
        ) -> Result<Vec<Destination>, DomainError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.destinations.clone()
        }
    }

    #[derive(Debug, Clone)]
    struct Dispatch {
        zone: ZoneId,
        size: usize,
        action: EventAction,
    }

    #[derive(Default)]
    struct MockPublisher {
        dispatches: Mutex<Vec<Dispatch>>,
        failing_zones: Vec<ZoneId>,
    }

    impl MockPublisher {
        fn failing_for(zone: &str) -> Self {
            Self {
                dispatches: Mutex::new(Vec::new()),
                failing_zones: vec![ZoneId::new(zone).unwrap()],
            }
        }

        fn dispatches(&self) -> Vec<Dispatch> {
            self.dispatches.lock().unwrap().clone()
        }

        fn dispatches_to(&self, zone: &str) -> Vec<Dispatch> {
            self.dispatches()
                .into_iter()
                .filter(|d| d.zone.as_str() == zone)
                .collect()
        }
    }

    #[async_trait]
    impl Publisher for MockPublisher {
        async fn send(&self, batch: &EventBatch, destination: &Destination) -> DispatchOutcome {
            self.dispatches.lock().unwrap().push(Dispatch {
                zone: destination.zone.clone(),
                size: batch.size(),
                action: batch.action(),
            });
            if self.failing_zones.contains(&destination.zone) {
                DispatchOutcome::Failed("503 service unavailable".to_string())
            } else {
                DispatchOutcome::Delivered
            }
        }
    }

    #[derive(Clone)]
    enum Step {
        Batch(EventBatch),
        Fault,
        Panic,
        Dry,
        Hang,
    }

    struct ScriptedSource {
        steps: VecDeque<Step>,
        releases: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        fn has_more(&mut self) -> bool {
            !self.steps.is_empty()
        }

        async fn next_batch(
            &mut self,
            _max_size: NonZeroUsize,
        ) -> Result<Option<EventBatch>, DomainError> {
            match self.steps.pop_front() {
                Some(Step::Batch(batch)) => Ok(Some(batch)),
                Some(Step::Fault) => Err(DomainError::new(ErrorCode::ProducerFault, "row decode failed")),
                Some(Step::Panic) => panic!("cursor state corrupted"),
                Some(Step::Hang) => {
                    std::future::pending::<()>().await;
                    Ok(None)
                }
                Some(Step::Dry) | None => Ok(None),
            }
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    type Transform = fn(&EventBatch, &Destination) -> Option<EventBatch>;

    enum Open {
        Steps(Vec<Step>),
        Nothing,
        Broken,
    }

    struct ScriptedProvider {
        open: Open,
        transform: Option<Transform>,
        opened_gate: Option<Arc<Notify>>,
        opens: AtomicUsize,
        releases: Arc<AtomicUsize>,
        failures: Mutex<Vec<(usize, ZoneId, ContextId)>>,
    }

    impl ScriptedProvider {
        fn new(open: Open) -> Self {
            Self {
                open,
                transform: None,
                opened_gate: None,
                opens: AtomicUsize::new(0),
                releases: Arc::new(AtomicUsize::new(0)),
                failures: Mutex::new(Vec::new()),
            }
        }

        fn yielding(steps: Vec<Step>) -> Self {
            Self::new(Open::Steps(steps))
        }

        fn with_transform(mut self, transform: Transform) -> Self {
            self.transform = Some(transform);
            self
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.opened_gate = Some(gate);
            self
        }

        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        fn releases(&self) -> usize {
            self.releases.load(Ordering::SeqCst)
        }

        fn failures(&self) -> Vec<(usize, ZoneId, ContextId)> {
            self.failures.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            "students"
        }

        fn object_type(&self) -> ObjectTypeKey {
            ObjectTypeKey::object("StudentPersonal")
        }

        async fn open_source(&self) -> Result<Option<Box<dyn EventSource>>, DomainError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.opened_gate {
                gate.notified().await;
            }
            match &self.open {
                Open::Steps(steps) => Ok(Some(Box::new(ScriptedSource {
                    steps: steps.clone().into(),
                    releases: Arc::clone(&self.releases),
                }))),
                Open::Nothing => Ok(None),
                Open::Broken => Err(DomainError::new(ErrorCode::SourceUnavailable, "cursor failed")),
            }
        }

        fn transform_for_destination(
            &self,
            batch: &EventBatch,
            destination: &Destination,
        ) -> Option<EventBatch> {
            match self.transform {
                Some(transform) => transform(batch, destination),
                None => Some(batch.clone()),
            }
        }

        fn on_dispatch_failure(&self, batch: &EventBatch, zone: &ZoneId, context: &ContextId) {
            self.failures
                .lock()
                .unwrap()
                .push((batch.size(), zone.clone(), context.clone()));
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    fn authorized(zone: &str) -> Destination {
        Destination::new(
            ZoneId::new(zone).unwrap(),
            ContextId::default_context(),
            ServiceRights::new().with_right(AccessRight::Provide, AccessType::Approved),
        )
    }

    fn denied(zone: &str) -> Destination {
        Destination::new(
            ZoneId::new(zone).unwrap(),
            ContextId::default_context(),
            ServiceRights::new().with_right(AccessRight::Provide, AccessType::Rejected),
        )
    }

    fn batch(size: usize) -> Step {
        Step::Batch(EventBatch::new(
            EventAction::Update,
            (0..size).map(|i| json!({ "refId": i })).collect(),
        ))
    }

    fn engine(resolver: Arc<MockSessionResolver>, publisher: Arc<MockPublisher>) -> BroadcastEngine {
        BroadcastEngine::new(resolver, Arc::new(ProvideRightGate::new()), publisher)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn absent_session_skips_lookup_and_source() {
        let resolver = Arc::new(MockSessionResolver::without_session());
        let publisher = Arc::new(MockPublisher::default());
        let provider = ScriptedProvider::yielding(vec![batch(3)]);

        let summary = engine(resolver.clone(), publisher.clone()).broadcast(&provider).await;

        assert_eq!(resolver.lookups(), 0);
        assert_eq!(provider.opens(), 0);
        assert_eq!(provider.releases(), 0);
        assert!(summary.is_noop());
        assert_eq!(summary.stopped_in, BroadcastState::Idle);
        assert_eq!(summary.skipped, Some(Unavailable::NoSession));
    }

    #[tokio::test]
    async fn empty_destinations_end_run_without_opening_source() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![]));
        let publisher = Arc::new(MockPublisher::default());
        let provider = ScriptedProvider::yielding(vec![batch(3)]);

        let summary = engine(resolver.clone(), publisher).broadcast(&provider).await;

        assert_eq!(resolver.lookups(), 1);
        assert_eq!(provider.opens(), 0);
        assert!(summary.is_noop());
        assert_eq!(summary.stopped_in, BroadcastState::SessionResolved);
    }

    #[tokio::test]
    async fn destination_lookup_fault_ends_run_quietly() {
        let resolver = Arc::new(MockSessionResolver::failing_lookup());
        let provider = ScriptedProvider::yielding(vec![batch(3)]);

        let summary = engine(resolver, Arc::new(MockPublisher::default()))
            .broadcast(&provider)
            .await;

        assert_eq!(provider.opens(), 0);
        assert!(summary.is_noop());
    }

    #[tokio::test]
    async fn missing_or_broken_source_is_never_released() {
        for open in [Open::Nothing, Open::Broken] {
            let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
            let publisher = Arc::new(MockPublisher::default());
            let provider = ScriptedProvider::new(open);

            let summary = engine(resolver, publisher.clone()).broadcast(&provider).await;

            assert_eq!(provider.opens(), 1);
            assert_eq!(provider.releases(), 0);
            assert!(publisher.dispatches().is_empty());
            assert!(summary.is_noop());
            assert_eq!(summary.stopped_in, BroadcastState::DestinationsResolved);
        }
    }

    #[tokio::test]
    async fn denied_destination_is_counted_but_never_dispatched() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![
            authorized("A"),
            denied("B"),
        ]));
        let publisher = Arc::new(MockPublisher::default());
        let provider = ScriptedProvider::yielding(vec![batch(10), batch(10), batch(5)]);

        let summary = engine(resolver, publisher.clone()).broadcast(&provider).await;

        let sizes: Vec<usize> = publisher.dispatches_to("A").iter().map(|d| d.size).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert!(publisher.dispatches_to("B").is_empty());
        assert_eq!(summary.attempted, 25);
        assert_eq!(summary.failed, 25);
        assert_eq!(summary.batches, 3);
        assert_eq!(provider.releases(), 1);
        assert_eq!(summary.stopped_in, BroadcastState::Finalizing);
    }

    #[tokio::test]
    async fn transport_failure_invokes_hook_and_counts_batch() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
        let publisher = Arc::new(MockPublisher::failing_for("A"));
        let provider = ScriptedProvider::yielding(vec![batch(4)]);

        let summary = engine(resolver, publisher).broadcast(&provider).await;

        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.failed, 4);
        let failures = provider.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 4);
        assert_eq!(failures[0].1.as_str(), "A");
        assert!(failures[0].2.is_default());
    }

    #[tokio::test]
    async fn transport_failure_does_not_block_siblings_or_later_batches() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![
            authorized("A"),
            authorized("B"),
        ]));
        let publisher = Arc::new(MockPublisher::failing_for("A"));
        let provider = ScriptedProvider::yielding(vec![batch(2), batch(3)]);

        let summary = engine(resolver, publisher.clone()).broadcast(&provider).await;

        let order: Vec<(String, usize)> = publisher
            .dispatches()
            .iter()
            .map(|d| (d.zone.as_str().to_string(), d.size))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A".to_string(), 2),
                ("B".to_string(), 2),
                ("A".to_string(), 3),
                ("B".to_string(), 3),
            ]
        );
        assert_eq!(summary.attempted, 5);
        assert_eq!(summary.failed, 5);
    }

    #[tokio::test]
    async fn dry_source_stops_iteration_but_still_releases() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
        let publisher = Arc::new(MockPublisher::default());
        let provider = ScriptedProvider::yielding(vec![batch(3), Step::Dry, batch(7)]);

        let summary = engine(resolver, publisher.clone()).broadcast(&provider).await;

        assert_eq!(publisher.dispatches().len(), 1);
        assert_eq!(summary.attempted, 3);
        assert_eq!(provider.releases(), 1);
    }

    #[tokio::test]
    async fn retrieval_fault_skips_one_batch_and_continues() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
        let publisher = Arc::new(MockPublisher::default());
        let provider = ScriptedProvider::yielding(vec![batch(3), Step::Fault, batch(7)]);

        let summary = engine(resolver, publisher.clone()).broadcast(&provider).await;

        assert_eq!(publisher.dispatches().len(), 2);
        assert_eq!(summary.attempted, 10);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.batches, 2);
        assert_eq!(provider.releases(), 1);
    }

    #[tokio::test]
    async fn panicking_source_skips_one_batch_and_continues() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
        let publisher = Arc::new(MockPublisher::default());
        let provider = ScriptedProvider::yielding(vec![batch(3), Step::Panic, batch(7)]);

        let summary = engine(resolver, publisher.clone()).broadcast(&provider).await;

        let sizes: Vec<usize> = publisher.dispatches().iter().map(|d| d.size).collect();
        assert_eq!(sizes, vec![3, 7]);
        assert_eq!(summary.attempted, 10);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.batches, 2);
        assert_eq!(provider.releases(), 1);
        assert!(!summary.is_noop());
    }

    #[tokio::test]
    async fn transform_cannot_change_action() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
        let publisher = Arc::new(MockPublisher::default());
        let provider = ScriptedProvider::yielding(vec![batch(4)]).with_transform(|batch, _| {
            Some(
                batch
                    .filtered(|obj| obj["refId"].as_u64().is_some_and(|id| id % 2 == 0))
                    .with_action(EventAction::Delete),
            )
        });

        let summary = engine(resolver, publisher.clone()).broadcast(&provider).await;

        let dispatches = publisher.dispatches();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].action, EventAction::Update);
        assert_eq!(dispatches[0].size, 2);
        assert_eq!(summary.attempted, 4);
    }

    #[tokio::test]
    async fn failure_count_uses_produced_size_not_transformed_size() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
        let publisher = Arc::new(MockPublisher::failing_for("A"));
        let provider = ScriptedProvider::yielding(vec![batch(6)])
            .with_transform(|batch, _| Some(batch.filtered(|_| false)));

        let summary = engine(resolver, publisher).broadcast(&provider).await;

        assert_eq!(summary.failed, 6);
        assert_eq!(provider.failures()[0].0, 0);
    }

    #[tokio::test]
    async fn transform_returning_none_skips_destination() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![
            authorized("A"),
            authorized("B"),
        ]));
        let publisher = Arc::new(MockPublisher::default());
        let provider = ScriptedProvider::yielding(vec![batch(5)]).with_transform(|batch, dest| {
            (dest.zone.as_str() != "A").then(|| batch.clone())
        });

        let summary = engine(resolver, publisher.clone()).broadcast(&provider).await;

        assert!(publisher.dispatches_to("A").is_empty());
        assert_eq!(publisher.dispatches_to("B").len(), 1);
        assert_eq!(summary.attempted, 5);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn batch_size_comes_from_provider_override_then_config() {
        let key = ObjectTypeKey::object("StudentPersonal");
        let event = EventBatch::new(EventAction::Create, (0..12).map(|i| json!(i)).collect());
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));

        let mut config = BroadcastConfig::default();
        config.provider_overrides.insert("students".to_string(), 5);

        let publisher = Arc::new(MockPublisher::default());
        let engine = BroadcastEngine::with_config(
            resolver,
            Arc::new(ProvideRightGate::new()),
            publisher.clone(),
            config,
        );

        let configured = InMemoryEventProvider::new("Students", key.clone(), vec![event.clone()]);
        engine.broadcast(&configured).await;
        let sizes: Vec<usize> = publisher.dispatches().iter().map(|d| d.size).collect();
        assert_eq!(sizes, vec![5, 5, 2]);

        publisher.dispatches.lock().unwrap().clear();
        let overridden = InMemoryEventProvider::new("Students", key, vec![event])
            .with_max_objects(NonZeroUsize::new(7).unwrap());
        engine.broadcast(&overridden).await;
        let sizes: Vec<usize> = publisher.dispatches().iter().map(|d| d.size).collect();
        assert_eq!(sizes, vec![7, 5]);
    }

    #[tokio::test]
    async fn concurrent_run_for_same_provider_is_refused() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
        let publisher = Arc::new(MockPublisher::default());
        let engine = engine(resolver, publisher.clone());

        let gate = Arc::new(Notify::new());
        let first = ScriptedProvider::yielding(vec![batch(2)]).gated(Arc::clone(&gate));
        let second = ScriptedProvider::yielding(vec![batch(9)]);

        let (first_summary, second_summary, _) = tokio::join!(
            engine.broadcast(&first),
            engine.broadcast(&second),
            async {
                tokio::task::yield_now().await;
                gate.notify_one();
            }
        );

        assert_eq!(first_summary.attempted, 2);
        assert!(second_summary.is_noop());
        assert!(second_summary.was_refused());
        assert!(!first_summary.was_refused());
        assert_eq!(second.opens(), 0);
        assert!(!engine.is_running("students"));
    }

    #[tokio::test]
    async fn abandoned_run_still_releases_source() {
        let resolver = Arc::new(MockSessionResolver::with_destinations(vec![authorized("A")]));
        let publisher = Arc::new(MockPublisher::default());
        let engine = engine(resolver, publisher.clone());
        let provider = ScriptedProvider::yielding(vec![batch(1), Step::Hang, batch(1)]);

        let outcome = tokio::time::timeout(Duration::from_millis(50), engine.broadcast(&provider)).await;

        assert!(outcome.is_err());
        assert_eq!(publisher.dispatches().len(), 1);
        assert_eq!(provider.releases(), 1);
        assert!(!engine.is_running("students"));
    }
}
