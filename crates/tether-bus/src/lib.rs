// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process service bus.
//!
//! The bus is the dynamic component registry trackers watch. Components
//! register service objects with string properties; listeners hear about
//! every registration and unregistration synchronously on the calling
//! thread. Services carrying the scan-ignore property are invisible to
//! listeners and to [`ServiceSource::available`].
//!
//! Every [`acquire`](ServiceSource::acquire) takes a use of the registration
//! and must be paired with a [`release`](ServiceSource::release).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::{debug, warn};

use tether_core::{
    Handle, ListenerId, Properties, Service, ServiceEvent, ServiceListener, ServiceSource,
    TetherError,
};

/// Default registration property that hides a service from trackers.
pub const SCAN_IGNORE: &str = "jaxSkip";

struct Registration {
    service: Arc<dyn Service>,
    properties: Properties,
    use_count: usize,
}

/// A thread-safe registry of service objects that emits [`ServiceEvent`]s.
pub struct ServiceBus {
    scan_ignore: String,
    next_handle: AtomicU64,
    next_listener: AtomicU64,
    registrations: DashMap<Handle, Registration>,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn ServiceListener>)>>,
}

impl ServiceBus {
    /// Create a bus that hides services carrying [`SCAN_IGNORE`].
    pub fn new() -> Self {
        Self::with_scan_ignore(SCAN_IGNORE)
    }

    /// Create a bus with a custom scan-ignore property name.
    pub fn with_scan_ignore(property: impl Into<String>) -> Self {
        Self {
            scan_ignore: property.into(),
            next_handle: AtomicU64::new(1),
            next_listener: AtomicU64::new(1),
            registrations: DashMap::new(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a service and notify listeners if it is visible.
    pub fn register(&self, service: Arc<dyn Service>, properties: Properties) -> Handle {
        let handle = Handle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let visible = self.is_visible(&properties);
        debug!(
            %handle,
            service = service.declaration().name(),
            visible,
            "service registered"
        );
        self.registrations.insert(
            handle,
            Registration {
                service,
                properties,
                use_count: 0,
            },
        );
        if visible {
            self.fire(ServiceEvent::Registered(handle));
        }
        handle
    }

    /// Unregister a service.
    ///
    /// Listeners hear `Unregistering` while the registration still exists so
    /// they can release what they acquired.
    pub fn unregister(&self, handle: Handle) -> Result<(), TetherError> {
        let visible = match self.registrations.get(&handle) {
            Some(reg) => self.is_visible(&reg.properties),
            None => return Err(TetherError::ServiceNotFound(handle)),
        };

        if visible {
            self.fire(ServiceEvent::Unregistering(handle));
        }

        if let Some((_, reg)) = self.registrations.remove(&handle) {
            if reg.use_count > 0 {
                warn!(
                    %handle,
                    uses = reg.use_count,
                    "service unregistered while still in use"
                );
            }
            debug!(%handle, "service unregistered");
        }
        Ok(())
    }

    /// Current number of outstanding uses of a registration.
    pub fn use_count(&self, handle: Handle) -> Option<usize> {
        self.registrations.get(&handle).map(|r| r.use_count)
    }

    /// Registration properties of a service.
    pub fn properties(&self, handle: Handle) -> Option<Properties> {
        self.registrations.get(&handle).map(|r| r.properties.clone())
    }

    /// Number of registrations, visible or not.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn is_visible(&self, properties: &Properties) -> bool {
        !properties.contains_key(&self.scan_ignore)
    }

    /// Deliver an event to every listener, outside the listener lock.
    fn fire(&self, event: ServiceEvent) {
        let listeners: Vec<Arc<dyn ServiceListener>> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener.service_changed(event);
        }
    }
}

impl Default for ServiceBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceSource for ServiceBus {
    fn add_listener(&self, listener: Arc<dyn ServiceListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(lid, _)| *lid != id);
    }

    fn available(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self
            .registrations
            .iter()
            .filter(|r| self.is_visible(&r.properties))
            .map(|r| *r.key())
            .collect();
        handles.sort();
        handles
    }

    fn acquire(&self, handle: Handle) -> Result<Option<Arc<dyn Service>>, TetherError> {
        Ok(self.registrations.get_mut(&handle).map(|mut reg| {
            reg.use_count += 1;
            Arc::clone(&reg.service)
        }))
    }

    fn release(&self, handle: Handle) -> Result<(), TetherError> {
        let mut reg = self
            .registrations
            .get_mut(&handle)
            .ok_or(TetherError::ServiceNotFound(handle))?;
        if reg.use_count == 0 {
            return Err(TetherError::Internal(format!(
                "service {handle} released more often than acquired"
            )));
        }
        reg.use_count -= 1;
        Ok(())
    }
}
