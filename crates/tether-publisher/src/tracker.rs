// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service tracker.
//!
//! Listens to a [`ServiceSource`], acquires each service that becomes
//! available, and keeps the [`Registry`] and its subscribers in step with
//! the source. Services present before the tracker starts are added as one
//! batch followed by a single notification.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use strum::{Display, IntoStaticStr};
use tracing::{debug, info, warn};

use tether_core::{Handle, ListenerId, ServiceEvent, ServiceSource, TetherError};

use crate::notifier::ChangeNotifier;
use crate::registry::Registry;

/// Lifecycle state of a [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum TrackerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// What handling one event did.
#[derive(Debug, Default)]
pub struct EventOutcome {
    /// The registry was mutated.
    pub changed: bool,
    /// Release and subscriber failures met along the way.
    pub failures: Vec<TetherError>,
}

pub struct Tracker {
    source: Arc<dyn ServiceSource>,
    registry: Arc<Registry>,
    notifier: Arc<ChangeNotifier>,
    state: Mutex<TrackerState>,
    processing: AtomicBool,
    owned: Mutex<HashSet<Handle>>,
    listener: Mutex<Option<ListenerId>>,
}

impl Tracker {
    pub fn new(
        source: Arc<dyn ServiceSource>,
        registry: Arc<Registry>,
        notifier: Arc<ChangeNotifier>,
    ) -> Self {
        Self {
            source,
            registry,
            notifier,
            state: Mutex::new(TrackerState::Stopped),
            processing: AtomicBool::new(false),
            owned: Mutex::new(HashSet::new()),
            listener: Mutex::new(None),
        }
    }

    pub fn state(&self) -> TrackerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of handles whose acquired instance the tracker still holds.
    pub fn owned_len(&self) -> usize {
        self.owned_lock().len()
    }

    /// Subscribe to the source and track everything already registered.
    pub fn start(self: &Arc<Self>) -> Result<EventOutcome, TetherError> {
        self.transition(&[TrackerState::Stopped], TrackerState::Starting)
            .map_err(|actual| TetherError::InvalidState {
                expected: TrackerState::Stopped.into(),
                actual: actual.into(),
            })?;

        let weak: Weak<Self> = Arc::downgrade(self);
        let id = self.source.add_listener(Arc::new(move |event: ServiceEvent| {
            if let Some(tracker) = weak.upgrade() {
                tracker.service_changed(event);
            }
        }));
        *self.listener.lock().unwrap_or_else(|e| e.into_inner()) = Some(id);
        self.processing.store(true, Ordering::SeqCst);

        let mut outcome = EventOutcome::default();
        let mut tracked = Vec::new();
        let available = self.source.available();
        for handle in &available {
            if !self.processing.load(Ordering::SeqCst) {
                break;
            }
            let step = self.track(*handle);
            if step.changed {
                tracked.push(*handle);
            }
            outcome.failures.extend(step.failures);
        }

        if self
            .transition(&[TrackerState::Starting], TrackerState::Running)
            .is_err()
        {
            // stop ran during enumeration; drop whatever it could not see
            self.processing.store(false, Ordering::SeqCst);
            self.detach_listener();
            outcome.failures.extend(self.release_all().failures);
            report_failures(&outcome.failures);
            info!(tracked = tracked.len(), "tracker start interrupted by stop");
            return Ok(outcome);
        }

        outcome.changed = !tracked.is_empty();
        if outcome.changed {
            info!(
                services = self.registry.len(),
                "kicking initial service set"
            );
            outcome.failures.extend(self.notifier.notify_changed().failures);
        }
        report_failures(&outcome.failures);
        info!(available = available.len(), "tracker started");
        Ok(outcome)
    }

    /// Unsubscribe, release everything still held, and clear the registry.
    ///
    /// Does nothing unless the tracker is starting or running. A stop while
    /// starting also ends enumeration early and the start rolls back.
    pub fn stop(&self) -> EventOutcome {
        if let Err(state) = self.transition(
            &[TrackerState::Running, TrackerState::Starting],
            TrackerState::Stopping,
        ) {
            debug!(%state, "tracker stop ignored");
            return EventOutcome::default();
        }
        self.processing.store(false, Ordering::SeqCst);
        self.detach_listener();

        let outcome = self.release_all();
        report_failures(&outcome.failures);

        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = TrackerState::Stopped;
        info!("tracker stopped");
        outcome
    }

    /// Route a source event to the matching handler.
    pub fn service_changed(&self, event: ServiceEvent) -> EventOutcome {
        match event {
            ServiceEvent::Registered(handle) => self.on_available(handle),
            ServiceEvent::Unregistering(handle) => self.on_gone(handle),
        }
    }

    /// A service became available.
    pub fn on_available(&self, handle: Handle) -> EventOutcome {
        if !self.processing.load(Ordering::SeqCst) {
            debug!(%handle, "tracker not processing, available event dropped");
            return EventOutcome::default();
        }
        let mut outcome = self.track(handle);
        if outcome.changed {
            outcome.failures.extend(self.notifier.notify_changed().failures);
        }
        report_failures(&outcome.failures);
        outcome
    }

    /// A service is going away.
    ///
    /// Subscribers are notified even when the handle was never tracked.
    pub fn on_gone(&self, handle: Handle) -> EventOutcome {
        if !self.processing.load(Ordering::SeqCst) {
            debug!(%handle, "tracker not processing, gone event dropped");
            return EventOutcome::default();
        }
        let mut outcome = EventOutcome::default();

        let was_owned = {
            let mut owned = self.owned_lock();
            outcome.changed = self.registry.remove(handle);
            owned.remove(&handle)
        };
        if was_owned && let Err(e) = self.release(handle) {
            outcome.failures.push(e);
        }
        debug!(%handle, removed = outcome.changed, "service gone");
        outcome.failures.extend(self.notifier.notify_changed().failures);
        report_failures(&outcome.failures);
        outcome
    }

    /// Acquire, classify and add one service without notifying.
    fn track(&self, handle: Handle) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        let service = match self.source.acquire(handle) {
            Ok(Some(service)) => service,
            Ok(None) => {
                debug!(%handle, "service vanished before it could be acquired");
                return outcome;
            }
            Err(e) => {
                outcome.failures.push(e);
                return outcome;
            }
        };

        let name = service.declaration().name().to_string();
        // registry and owned set change together so a racing gone event
        // sees either both or neither
        let added = {
            let mut owned = self.owned_lock();
            let added = !owned.contains(&handle) && self.registry.add(handle, service);
            if added {
                owned.insert(handle);
            }
            added
        };
        if added {
            debug!(%handle, service = %name, "service tracked");
            outcome.changed = true;
        } else {
            debug!(%handle, service = %name, "service not tracked");
            if let Err(e) = self.release(handle) {
                outcome.failures.push(e);
            }
        }
        outcome
    }

    /// Clear the registry and release every handle still owned.
    fn release_all(&self) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        let owned: Vec<Handle> = {
            let mut owned = self.owned_lock();
            outcome.changed = !self.registry.is_empty();
            self.registry.clear();
            owned.drain().collect()
        };
        for handle in owned {
            if let Err(e) = self.release(handle) {
                outcome.failures.push(e);
            }
        }
        outcome
    }

    fn detach_listener(&self) {
        let id = self
            .listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(id) = id {
            self.source.remove_listener(id);
        }
    }

    fn owned_lock(&self) -> std::sync::MutexGuard<'_, HashSet<Handle>> {
        self.owned.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn release(&self, handle: Handle) -> Result<(), TetherError> {
        self.source
            .release(handle)
            .map_err(|e| TetherError::Release {
                handle,
                source: Box::new(e),
            })
    }

    /// Move to `to` if the current state is one of `from`; otherwise return
    /// the current state.
    fn transition(&self, from: &[TrackerState], to: TrackerState) -> Result<(), TrackerState> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !from.contains(&state) {
            return Err(*state);
        }
        *state = to;
        Ok(())
    }
}

fn report_failures(failures: &[TetherError]) {
    for failure in failures {
        warn!(error = %failure, "tracker bookkeeping failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use std::sync::atomic::AtomicUsize;
    use tether_bus::ServiceBus;
    use tether_core::{MethodDecl, Properties, Service, ServiceListener, TypeDecl};
    use tether_test_utils::{FlakySource, MockService};

    struct Fixture {
        source: Arc<FlakySource>,
        registry: Arc<Registry>,
        notifications: Arc<AtomicUsize>,
        tracker: Arc<Tracker>,
    }

    fn fixture() -> Fixture {
        let source = Arc::new(FlakySource::new());
        let registry = Arc::new(Registry::new());
        let notifier = Arc::new(ChangeNotifier::new());
        let notifications = Arc::new(AtomicUsize::new(0));
        let n = Arc::clone(&notifications);
        notifier.subscribe(move || {
            n.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let tracker = Arc::new(Tracker::new(
            Arc::clone(&source) as Arc<dyn ServiceSource>,
            Arc::clone(&registry),
            notifier,
        ));
        Fixture {
            source,
            registry,
            notifications,
            tracker,
        }
    }

    fn endpoint(name: &str) -> Arc<dyn Service> {
        MockService::endpoint(name, "/x").into_arc()
    }

    #[test]
    fn start_batches_preexisting_services() {
        let f = fixture();
        f.source.register(endpoint("a.A"));
        f.source.register(MockService::plain("a.Plain").into_arc());
        f.source.register(MockService::provider("a.P").into_arc());

        let outcome = f.tracker.start().unwrap();
        assert!(outcome.changed);
        assert_eq!(f.tracker.state(), TrackerState::Running);
        assert_eq!(f.registry.len(), 2);
        assert_eq!(f.notifications.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_with_nothing_classifiable_does_not_notify() {
        let f = fixture();
        let plain = f.source.register(MockService::plain("a.Plain").into_arc());
        f.tracker.start().unwrap();
        assert_eq!(f.notifications.load(Ordering::SeqCst), 0);
        // rejected instance was handed back
        assert_eq!(f.source.bus().use_count(plain), Some(0));
    }

    #[test]
    fn start_twice_is_rejected() {
        let f = fixture();
        f.tracker.start().unwrap();
        let err = f.tracker.start().unwrap_err();
        assert!(matches!(
            err,
            TetherError::InvalidState {
                expected: "stopped",
                actual: "running"
            }
        ));
    }

    #[test]
    fn live_events_notify_per_change() {
        let f = fixture();
        f.tracker.start().unwrap();

        let h = f.source.register(endpoint("a.A"));
        assert!(f.registry.contains(h));
        assert_eq!(f.source.bus().use_count(h), Some(1));
        assert_eq!(f.notifications.load(Ordering::SeqCst), 1);

        f.source.unregister(h);
        assert!(f.registry.is_empty());
        assert_eq!(f.notifications.load(Ordering::SeqCst), 2);
        assert_eq!(f.tracker.owned_len(), 0);
    }

    #[test]
    fn gone_for_untracked_handle_only_notifies() {
        let f = fixture();
        f.tracker.start().unwrap();
        f.source.register(endpoint("a.A"));
        let before = f.notifications.load(Ordering::SeqCst);

        let outcome = f.tracker.on_gone(Handle(999));
        assert!(!outcome.changed);
        assert!(outcome.failures.is_empty());
        assert!(!f.source.released().contains(&Handle(999)));
        assert_eq!(f.registry.len(), 1);
        assert_eq!(f.notifications.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn duplicate_available_is_idempotent() {
        let f = fixture();
        f.tracker.start().unwrap();
        let h = f.source.register(endpoint("a.A"));

        let again = f.tracker.on_available(h);
        assert!(!again.changed);
        assert_eq!(f.registry.len(), 1);
        assert_eq!(f.source.bus().use_count(h), Some(1));
    }

    #[test]
    fn release_failure_is_reported_and_bookkeeping_continues() {
        let f = fixture();
        f.tracker.start().unwrap();
        let h = f.source.register(endpoint("a.A"));
        f.source.refuse_release(h);

        let outcome = f.tracker.on_gone(h);
        assert!(outcome.changed);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0], TetherError::Release { handle, .. } if handle == h));
        assert!(f.registry.is_empty());
        assert_eq!(f.notifications.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stop_releases_owned_and_clears() {
        let f = fixture();
        let a = f.source.register(endpoint("a.A"));
        let b = f.source.register(endpoint("a.B"));
        f.tracker.start().unwrap();

        let outcome = f.tracker.stop();
        assert!(outcome.changed);
        assert_eq!(f.tracker.state(), TrackerState::Stopped);
        assert!(f.registry.is_empty());
        assert_eq!(f.source.bus().use_count(a), Some(0));
        assert_eq!(f.source.bus().use_count(b), Some(0));

        // no longer listening
        f.source.register(endpoint("a.C"));
        assert!(f.registry.is_empty());
    }

    #[test]
    fn stop_when_stopped_is_a_no_op() {
        let f = fixture();
        let outcome = f.tracker.stop();
        assert!(!outcome.changed);
        assert_eq!(f.tracker.state(), TrackerState::Stopped);
    }

    #[test]
    fn events_before_start_are_dropped() {
        let f = fixture();
        let h = f.source.register(endpoint("a.A"));
        let outcome = f.tracker.on_available(h);
        assert!(!outcome.changed);
        assert!(f.source.acquired().is_empty());
    }

    #[test]
    fn tracker_can_restart() {
        let f = fixture();
        f.tracker.start().unwrap();
        f.tracker.stop();
        f.source.register(endpoint("a.A"));
        f.tracker.start().unwrap();
        assert_eq!(f.registry.len(), 1);
    }

    #[test]
    fn scan_ignored_services_are_never_acquired() {
        let f = fixture();
        f.tracker.start().unwrap();
        let mut props = Properties::new();
        props.insert(tether_bus::SCAN_IGNORE.to_string(), "true".into());
        let decl = TypeDecl::new("a.Hidden")
            .path("/hidden")
            .method(MethodDecl::new("get").get());
        f.source
            .bus()
            .register(MockService::new(decl).into_arc(), props);
        assert!(f.registry.is_empty());
        assert!(f.source.acquired().is_empty());
    }

    /// Delegates to a bus but stops the tracker on the first acquire.
    struct StopOnAcquire {
        bus: ServiceBus,
        tracker: OnceLock<Weak<Tracker>>,
        fired: AtomicBool,
    }

    impl ServiceSource for StopOnAcquire {
        fn add_listener(&self, listener: Arc<dyn ServiceListener>) -> ListenerId {
            self.bus.add_listener(listener)
        }

        fn remove_listener(&self, id: ListenerId) {
            self.bus.remove_listener(id)
        }

        fn available(&self) -> Vec<Handle> {
            self.bus.available()
        }

        fn acquire(&self, handle: Handle) -> Result<Option<Arc<dyn Service>>, TetherError> {
            if !self.fired.swap(true, Ordering::SeqCst)
                && let Some(tracker) = self.tracker.get().and_then(Weak::upgrade)
            {
                tracker.stop();
            }
            self.bus.acquire(handle)
        }

        fn release(&self, handle: Handle) -> Result<(), TetherError> {
            self.bus.release(handle)
        }
    }

    #[test]
    fn stop_during_start_rolls_back_startup() {
        let source = Arc::new(StopOnAcquire {
            bus: ServiceBus::new(),
            tracker: OnceLock::new(),
            fired: AtomicBool::new(false),
        });
        let a = source.bus.register(endpoint("a.A"), Properties::new());
        let b = source.bus.register(endpoint("a.B"), Properties::new());
        let registry = Arc::new(Registry::new());
        let tracker = Arc::new(Tracker::new(
            Arc::clone(&source) as Arc<dyn ServiceSource>,
            Arc::clone(&registry),
            Arc::new(ChangeNotifier::new()),
        ));
        let _ = source.tracker.set(Arc::downgrade(&tracker));

        let outcome = tracker.start().unwrap();
        assert!(!outcome.changed);
        assert!(outcome.failures.is_empty());
        assert_eq!(tracker.state(), TrackerState::Stopped);
        assert!(registry.is_empty());
        assert_eq!(tracker.owned_len(), 0);
        assert_eq!(source.bus.use_count(a), Some(0));
        assert_eq!(source.bus.use_count(b), Some(0));

        // listener went with the interrupted start
        source.bus.register(endpoint("a.C"), Properties::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn racing_available_and_gone_never_leak_a_use() {
        let f = fixture();
        f.tracker.start().unwrap();

        // hidden registrations emit no events, so only the calls below drive
        // the tracker
        let handles: Vec<Handle> = (0..200)
            .map(|i| {
                let mut props = Properties::new();
                props.insert(tether_bus::SCAN_IGNORE.to_string(), "true".into());
                f.source
                    .bus()
                    .register(endpoint(&format!("a.S{i}")), props)
            })
            .collect();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for &h in &handles {
                    f.tracker.on_available(h);
                }
            });
            scope.spawn(|| {
                for &h in &handles {
                    f.tracker.on_gone(h);
                }
            });
        });

        for &h in &handles {
            let uses = f.source.bus().use_count(h);
            assert!(uses <= Some(1), "{h} held {uses:?} times");
            assert_eq!(f.registry.contains(h), uses == Some(1), "{h}");
        }
        assert_eq!(f.tracker.owned_len(), f.registry.len());

        let outcome = f.tracker.stop();
        assert!(outcome.failures.is_empty());
        for &h in &handles {
            assert_eq!(f.source.bus().use_count(h), Some(0));
        }
    }

    #[tracing_test::traced_test]
    #[test]
    fn subscriber_failures_are_logged() {
        let f = fixture();
        f.tracker.notifier.subscribe(|| Err("listener broke".into()));
        f.tracker.start().unwrap();
        f.source.register(endpoint("a.A"));
        assert!(logs_contain("tracker bookkeeping failure"));
        assert!(logs_contain("listener broke"));
    }
}
