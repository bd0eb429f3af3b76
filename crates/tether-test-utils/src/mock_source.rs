// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event source double backed by a real [`ServiceBus`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tether_bus::ServiceBus;
use tether_core::{
    Handle, ListenerId, Service, ServiceListener, ServiceSource, TetherError,
};

/// A [`ServiceSource`] that records acquire/release traffic and can be told
/// to refuse releases for specific handles.
#[derive(Default)]
pub struct FlakySource {
    bus: ServiceBus,
    refuse_release: Mutex<HashSet<Handle>>,
    acquired: Mutex<Vec<Handle>>,
    released: Mutex<Vec<Handle>>,
}

impl FlakySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bus services are registered on.
    pub fn bus(&self) -> &ServiceBus {
        &self.bus
    }

    /// Register a service with no properties.
    pub fn register(&self, service: Arc<dyn Service>) -> Handle {
        self.bus.register(service, Default::default())
    }

    pub fn unregister(&self, handle: Handle) {
        if let Err(e) = self.bus.unregister(handle) {
            tracing::debug!(error = %e, "unregister in test source failed");
        }
    }

    /// Make every release of `handle` fail from now on.
    pub fn refuse_release(&self, handle: Handle) {
        self.refuse_release.lock().unwrap().insert(handle);
    }

    /// Handles passed to `acquire`, in call order.
    pub fn acquired(&self) -> Vec<Handle> {
        self.acquired.lock().unwrap().clone()
    }

    /// Handles passed to `release`, in call order (including refused ones).
    pub fn released(&self) -> Vec<Handle> {
        self.released.lock().unwrap().clone()
    }
}

impl ServiceSource for FlakySource {
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
        self.acquired.lock().unwrap().push(handle);
        self.bus.acquire(handle)
    }

    fn release(&self, handle: Handle) -> Result<(), TetherError> {
        self.released.lock().unwrap().push(handle);
        if self.refuse_release.lock().unwrap().contains(&handle) {
            return Err(TetherError::Internal(format!(
                "release of {handle} refused"
            )));
        }
        self.bus.release(handle)
    }
}
