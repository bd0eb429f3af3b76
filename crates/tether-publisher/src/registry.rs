// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tracked-service registry.
//!
//! Writers serialize on a mutex and publish a fresh immutable map through
//! [`ArcSwap`]; readers load the current map without locking. A snapshot
//! handed out earlier is never affected by later mutation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::debug;

use tether_core::{Handle, Service};

use crate::classifier::{Classification, classify_service};
use crate::recording;

/// One tracked registration. Identity is the handle alone.
#[derive(Clone)]
pub struct TrackedEntry {
    handle: Handle,
    service: Arc<dyn Service>,
    classification: Arc<Classification>,
}

impl TrackedEntry {
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn service(&self) -> &Arc<dyn Service> {
        &self.service
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Declared type name of the payload.
    pub fn type_name(&self) -> &str {
        self.service.declaration().name()
    }
}

impl PartialEq for TrackedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for TrackedEntry {}

impl std::hash::Hash for TrackedEntry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl std::fmt::Debug for TrackedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedEntry")
            .field("handle", &self.handle)
            .field("type", &self.type_name())
            .field("classification", &self.classification)
            .finish()
    }
}

type EntryMap = BTreeMap<Handle, TrackedEntry>;

/// Point-in-time view of the registry, ordered by handle.
#[derive(Clone, Default)]
pub struct Snapshot(Arc<EntryMap>);

impl Snapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.0.contains_key(&handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&TrackedEntry> {
        self.0.get(&handle)
    }

    pub fn handles(&self) -> Vec<Handle> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedEntry> {
        self.0.values()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.values()).finish()
    }
}

/// Concurrent set of tracked services keyed by handle.
pub struct Registry {
    entries: ArcSwap<EntryMap>,
    writer: Mutex<()>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(EntryMap::new()),
            writer: Mutex::new(()),
        }
    }

    /// Track a service under `handle`.
    ///
    /// Returns `false` without mutating when the service plays no role or the
    /// handle is already tracked.
    pub fn add(&self, handle: Handle, service: Arc<dyn Service>) -> bool {
        let classification = classify_service(service.as_ref());
        if !classification.is_applicable() {
            debug!(%handle, service = service.declaration().name(), "service plays no role");
            return false;
        }

        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.entries.load_full();
        if current.contains_key(&handle) {
            debug!(%handle, "handle already tracked");
            return false;
        }

        let mut next = EntryMap::clone(&current);
        next.insert(
            handle,
            TrackedEntry {
                handle,
                service,
                classification: Arc::new(classification),
            },
        );
        self.publish(next);
        true
    }

    /// Stop tracking `handle`. Returns whether an entry existed.
    pub fn remove(&self, handle: Handle) -> bool {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.entries.load_full();
        if !current.contains_key(&handle) {
            return false;
        }
        let mut next = EntryMap::clone(&current);
        next.remove(&handle);
        self.publish(next);
        true
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        self.publish(EntryMap::new());
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.entries.load_full())
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.load().contains_key(&handle)
    }

    pub fn get(&self, handle: Handle) -> Option<TrackedEntry> {
        self.entries.load().get(&handle).cloned()
    }

    fn publish(&self, next: EntryMap) {
        recording::set_registry_entries(next.len());
        self.entries.store(Arc::new(next));
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
