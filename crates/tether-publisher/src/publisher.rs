// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher facade.
//!
//! Owns the registry, the change notifier and the tracker, and reloads the
//! dispatcher whenever the tracked set changes. Read accessors derive fresh
//! role-partitioned views from a registry snapshot on every call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use tether_core::{
    BoxError, Dispatcher, DocsGenerator, EndpointViews, FeatureContext, Properties, Service,
    ServiceSource, SingletonSet, TetherError,
};

use crate::holder::Holder;
use crate::notifier::{ChangeNotifier, SubscriptionId};
use crate::recording;
use crate::registry::{Registry, Snapshot, TrackedEntry};
use crate::tracker::{Tracker, TrackerState};

/// Mount path used when none is configured.
pub const DEFAULT_PATH: &str = "/services";

/// Dispatcher property disabling service-loader lookups.
pub const METAINF_SERVICES_LOOKUP_DISABLE: &str = "metainf.services.lookup.disable";

/// Dispatcher property disabling feature auto-discovery.
pub const FEATURE_AUTODISCOVERY_DISABLE: &str = "feature.autodiscovery.disable";

/// Properties every singleton set starts from.
pub fn default_properties() -> Properties {
    Properties::from([
        (METAINF_SERVICES_LOOKUP_DISABLE.to_string(), "false".to_string()),
        (FEATURE_AUTODISCOVERY_DISABLE.to_string(), "true".to_string()),
    ])
}

pub struct PublisherBuilder {
    source: Arc<dyn ServiceSource>,
    dispatcher: Arc<dyn Dispatcher>,
    path: String,
    inhibit_start: bool,
    docs: Option<Arc<dyn DocsGenerator>>,
}

impl PublisherBuilder {
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// When set, [`Publisher::activate`] logs an error and does nothing.
    pub fn inhibit_start(mut self, inhibit: bool) -> Self {
        self.inhibit_start = inhibit;
        self
    }

    pub fn docs(mut self, docs: Arc<dyn DocsGenerator>) -> Self {
        self.docs = Some(docs);
        self
    }

    pub fn build(self) -> Arc<Publisher> {
        Arc::new(Publisher {
            path: self.path,
            inhibit_start: self.inhibit_start,
            source: self.source,
            dispatcher: self.dispatcher,
            docs: self.docs,
            registry: Arc::new(Registry::new()),
            notifier: Arc::new(ChangeNotifier::new()),
            tracker: Holder::new(),
            initialized: AtomicBool::new(false),
            reload_subscription: Mutex::new(None),
        })
    }
}

pub struct Publisher {
    path: String,
    inhibit_start: bool,
    source: Arc<dyn ServiceSource>,
    dispatcher: Arc<dyn Dispatcher>,
    docs: Option<Arc<dyn DocsGenerator>>,
    registry: Arc<Registry>,
    notifier: Arc<ChangeNotifier>,
    tracker: Holder<Tracker>,
    initialized: AtomicBool,
    reload_subscription: Mutex<Option<SubscriptionId>>,
}

impl Publisher {
    pub fn builder(
        source: Arc<dyn ServiceSource>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> PublisherBuilder {
        PublisherBuilder {
            source,
            dispatcher,
            path: DEFAULT_PATH.to_string(),
            inhibit_start: false,
            docs: None,
        }
    }

    /// Start tracking and load the dispatcher with the current set.
    ///
    /// Activating an active publisher is an error. A dispatcher failure on
    /// the initial reload is returned, but tracking stays active.
    pub fn activate(self: &Arc<Self>) -> Result<(), TetherError> {
        if self.inhibit_start {
            error!(path = %self.path, "publisher start inhibited by configuration");
            return Ok(());
        }
        if self.tracker.is_provisioned() {
            return Err(TetherError::InvalidState {
                expected: "inactive",
                actual: "active",
            });
        }

        let weak = Arc::downgrade(self);
        let id = self.notifier.subscribe(move || -> Result<(), BoxError> {
            match weak.upgrade() {
                Some(publisher) => Ok(publisher.on_change()?),
                None => Ok(()),
            }
        });
        *self.reload_lock() = Some(id);

        let tracker = Tracker::new(
            Arc::clone(&self.source),
            Arc::clone(&self.registry),
            Arc::clone(&self.notifier),
        );
        self.tracker.provision(tracker)?;
        self.tracker.try_with(|t| t.start())?;

        self.initialized.store(true, Ordering::SeqCst);
        info!(path = %self.path, services = self.registry.len(), "publisher activated");
        self.reload()
    }

    /// Stop tracking and detach from the notifier. Safe to call repeatedly.
    pub fn deactivate(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        if self.tracker.close(|t| t.stop()).is_some() {
            info!(path = %self.path, "publisher deactivated");
        }
        if let Some(id) = self.reload_lock().take() {
            self.notifier.unsubscribe(id);
        }
    }

    fn on_change(&self) -> Result<(), TetherError> {
        if !self.initialized.load(Ordering::SeqCst) {
            debug!("change before initialization, reload skipped");
            return Ok(());
        }
        self.reload()
    }

    /// Hand the current singleton set to the dispatcher.
    pub fn reload(&self) -> Result<(), TetherError> {
        let singletons = self.singletons();
        match self.dispatcher.reload(&singletons) {
            Ok(()) => {
                recording::record_reload("ok");
                info!(
                    services = singletons.len(),
                    features = singletons.enabled_features.len(),
                    "dispatcher reloaded"
                );
                Ok(())
            }
            Err(e) => {
                recording::record_reload("error");
                error!(error = %e, "dispatcher reload failed");
                Err(e)
            }
        }
    }

    /// Everything the dispatcher should serve, with feature-adjusted properties.
    pub fn singletons(&self) -> SingletonSet {
        let snapshot = self.registry.snapshot();
        let mut context = FeatureContext::new(default_properties());
        let mut enabled_features = Vec::new();

        for entry in snapshot.iter().filter(|e| e.classification().is_feature()) {
            if let Some(feature) = entry.service().as_feature()
                && feature.configure(&mut context)
            {
                enabled_features.push(entry.type_name().to_string());
            }
        }

        SingletonSet {
            services: snapshot.iter().map(|e| Arc::clone(e.service())).collect(),
            properties: context.into_properties(),
            enabled_features,
        }
    }

    /// Endpoint descriptors keyed by type name.
    ///
    /// When several registrations share a type name the earliest one wins.
    pub fn endpoint_views(&self) -> EndpointViews {
        let mut views = EndpointViews::new();
        for entry in self.registry.snapshot().iter() {
            if entry.classification().is_endpoint() {
                views
                    .entry(entry.type_name().to_string())
                    .or_insert_with(|| entry.classification().descriptors().to_vec());
            }
        }
        views
    }

    pub fn raw_endpoints(&self) -> Vec<Arc<dyn Service>> {
        self.instances(|e| e.classification().is_endpoint())
    }

    pub fn provider_instances(&self) -> Vec<Arc<dyn Service>> {
        self.instances(|e| e.classification().is_provider())
    }

    pub fn feature_instances(&self) -> Vec<Arc<dyn Service>> {
        self.instances(|e| e.classification().is_feature())
    }

    fn instances(
        &self,
        keep: impl Fn(&TrackedEntry) -> bool,
    ) -> Vec<Arc<dyn Service>> {
        self.registry
            .snapshot()
            .iter()
            .filter(|e| keep(e))
            .map(|e| Arc::clone(e.service()))
            .collect()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Configured mount path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn tracker_state(&self) -> TrackerState {
        self.tracker
            .get()
            .map(|t| t.state())
            .unwrap_or(TrackerState::Stopped)
    }

    /// Generated API documentation, when a generator is wired.
    pub fn api_docs(&self) -> Option<serde_json::Value> {
        self.docs
            .as_ref()
            .map(|docs| docs.generate(&self.endpoint_views()))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.registry.snapshot()
    }

    fn reload_lock(&self) -> std::sync::MutexGuard<'_, Option<SubscriptionId>> {
        self.reload_subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{MethodDecl, TypeDecl, Verb};
    use tether_test_utils::{FlakySource, MockService, RecordingDispatcher};

    fn setup() -> (Arc<FlakySource>, Arc<RecordingDispatcher>, Arc<Publisher>) {
        let source = Arc::new(FlakySource::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let publisher = Publisher::builder(
            Arc::clone(&source) as Arc<dyn ServiceSource>,
            Arc::clone(&dispatcher) as Arc<dyn Dispatcher>,
        )
        .build();
        (source, dispatcher, publisher)
    }

    #[test]
    fn default_path() {
        let (_, _, publisher) = setup();
        assert_eq!(publisher.path(), "/services");
        assert!(!publisher.is_active());
        assert_eq!(publisher.tracker_state(), TrackerState::Stopped);
    }

    #[test]
    fn activate_reloads_once_with_preexisting_services() {
        let (source, dispatcher, publisher) = setup();
        source.register(MockService::endpoint("a.Users", "/users").into_arc());
        source.register(MockService::provider("a.Json").into_arc());

        publisher.activate().unwrap();
        assert_eq!(dispatcher.reload_count(), 1);
        assert_eq!(dispatcher.last_names(), vec!["a.Users", "a.Json"]);
        assert_eq!(publisher.tracker_state(), TrackerState::Running);
    }

    #[test]
    fn live_changes_reload_the_dispatcher() {
        let (source, dispatcher, publisher) = setup();
        publisher.activate().unwrap();
        let h = source.register(MockService::endpoint("a.Users", "/users").into_arc());
        source.unregister(h);
        assert_eq!(dispatcher.reload_count(), 3);
        assert!(dispatcher.last().unwrap().is_empty());
    }

    #[test]
    fn activate_twice_is_rejected() {
        let (_, _, publisher) = setup();
        publisher.activate().unwrap();
        assert!(matches!(
            publisher.activate(),
            Err(TetherError::InvalidState { .. })
        ));
    }

    #[test]
    fn deactivate_stops_reloads() {
        let (source, dispatcher, publisher) = setup();
        publisher.activate().unwrap();
        publisher.deactivate();
        publisher.deactivate();
        source.register(MockService::endpoint("a.Users", "/users").into_arc());
        assert_eq!(dispatcher.reload_count(), 1);
        assert!(publisher.endpoint_views().is_empty());
        assert!(!publisher.is_active());
    }

    #[tracing_test::traced_test]
    #[test]
    fn inhibited_publisher_never_starts() {
        let source = Arc::new(FlakySource::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let publisher = Publisher::builder(source.clone(), dispatcher.clone())
            .inhibit_start(true)
            .build();
        source.register(MockService::endpoint("a.Users", "/users").into_arc());

        publisher.activate().unwrap();
        assert_eq!(dispatcher.reload_count(), 0);
        assert!(!publisher.is_active());
        assert!(logs_contain("publisher start inhibited by configuration"));
    }

    #[test]
    fn singleton_properties_include_defaults_and_features() {
        let (source, dispatcher, publisher) = setup();
        source.register(MockService::feature("a.Sse").into_arc());
        source.register(MockService::plain("a.Off").with_feature(false).into_arc());
        publisher.activate().unwrap();

        let set = dispatcher.last().unwrap();
        assert_eq!(set.properties[METAINF_SERVICES_LOOKUP_DISABLE], "false");
        assert_eq!(set.properties[FEATURE_AUTODISCOVERY_DISABLE], "true");
        assert_eq!(set.properties["a.Sse.enabled"], "true");
        assert!(!set.properties.contains_key("a.Off.enabled"));
        assert_eq!(set.enabled_features, vec!["a.Sse".to_string()]);
        assert_eq!(publisher.feature_instances().len(), 2);
    }

    #[test]
    fn views_are_partitioned_by_role() {
        let (source, _, publisher) = setup();
        let both = TypeDecl::new("a.Both")
            .path("/both")
            .provider()
            .method(MethodDecl::new("get").get());
        source.register(MockService::new(both).into_arc());
        source.register(MockService::provider("a.P").into_arc());
        publisher.activate().unwrap();

        assert_eq!(publisher.raw_endpoints().len(), 1);
        assert_eq!(publisher.provider_instances().len(), 2);
        let views = publisher.endpoint_views();
        assert_eq!(views["a.Both"][0].verb(), Verb::Get);
        assert!(!views.contains_key("a.P"));
    }

    #[test]
    fn duplicate_type_names_keep_the_first_registration() {
        let (source, _, publisher) = setup();
        source.register(MockService::endpoint("a.Same", "/first").into_arc());
        source.register(MockService::endpoint("a.Same", "/second").into_arc());
        publisher.activate().unwrap();
        assert_eq!(publisher.endpoint_views()["a.Same"][0].path(), "/first");
        assert_eq!(publisher.raw_endpoints().len(), 2);
    }

    #[test]
    fn failing_dispatcher_is_reported() {
        let (source, dispatcher, publisher) = setup();
        dispatcher.set_failing(true);
        assert!(matches!(
            publisher.activate(),
            Err(TetherError::Dispatcher { .. })
        ));
        // tracking keeps going
        source.register(MockService::endpoint("a.Users", "/users").into_arc());
        assert_eq!(publisher.endpoint_views().len(), 1);
        assert_eq!(dispatcher.reload_count(), 2);
    }

    struct CountingDocs;

    impl DocsGenerator for CountingDocs {
        fn generate(&self, endpoints: &EndpointViews) -> serde_json::Value {
            serde_json::json!({ "resources": endpoints.len() })
        }
    }

    #[test]
    fn docs_slot_is_optional() {
        let (source, _, publisher) = setup();
        assert!(publisher.api_docs().is_none());

        let with_docs = Publisher::builder(source.clone(), Arc::new(RecordingDispatcher::new()))
            .docs(Arc::new(CountingDocs))
            .build();
        source.register(MockService::endpoint("a.Users", "/users").into_arc());
        with_docs.activate().unwrap();
        assert_eq!(
            with_docs.api_docs(),
            Some(serde_json::json!({ "resources": 1 }))
        );
    }
}
