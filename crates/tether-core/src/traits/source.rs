// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event source seam.
//!
//! A [`ServiceSource`] is the component-lifecycle watcher the tracker listens
//! to. Instances are acquired from the source when they become available and
//! must be released symmetrically when they go away or are rejected.

use std::sync::Arc;

use crate::error::TetherError;
use crate::traits::service::Service;
use crate::types::Handle;

/// A change in the set of registered services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceEvent {
    /// A service was registered and can be acquired.
    Registered(Handle),
    /// A service is about to be unregistered.
    Unregistering(Handle),
}

impl ServiceEvent {
    pub fn handle(&self) -> Handle {
        match self {
            ServiceEvent::Registered(h) | ServiceEvent::Unregistering(h) => *h,
        }
    }
}

/// Identifies a listener attached to a [`ServiceSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Receives service events. May be called from any thread.
pub trait ServiceListener: Send + Sync {
    fn service_changed(&self, event: ServiceEvent);
}

impl<F> ServiceListener for F
where
    F: Fn(ServiceEvent) + Send + Sync,
{
    fn service_changed(&self, event: ServiceEvent) {
        self(event)
    }
}

/// The dynamic component registry services are tracked from.
pub trait ServiceSource: Send + Sync {
    /// Attach a listener for registration changes.
    fn add_listener(&self, listener: Arc<dyn ServiceListener>) -> ListenerId;

    /// Detach a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Handles of every service currently registered and visible to trackers.
    fn available(&self) -> Vec<Handle>;

    /// Take a use of the service behind `handle`.
    ///
    /// Returns `Ok(None)` when the registration has already gone away.
    fn acquire(&self, handle: Handle) -> Result<Option<Arc<dyn Service>>, TetherError>;

    /// Give back a use taken with [`acquire`](ServiceSource::acquire).
    fn release(&self, handle: Handle) -> Result<(), TetherError>;
}
