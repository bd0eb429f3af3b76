// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Late-bound component slot.

use std::sync::{Arc, RwLock};

use tether_core::TetherError;

/// Holds a component that is provisioned after construction and closed
/// before shutdown. Closures run on a cloned `Arc`, never under the lock.
pub struct Holder<T> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> Holder<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    pub fn provision(&self, component: impl Into<Arc<T>>) -> Result<(), TetherError> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Err(TetherError::AlreadyProvisioned);
        }
        *slot = Some(component.into());
        Ok(())
    }

    /// Run `f` against the component.
    pub fn with<R>(&self, f: impl FnOnce(&Arc<T>) -> R) -> Result<R, TetherError> {
        let component = self.get().ok_or(TetherError::NotProvisioned)?;
        Ok(f(&component))
    }

    /// Like [`with`](Self::with) for closures that can fail.
    pub fn try_with<R>(
        &self,
        f: impl FnOnce(&Arc<T>) -> Result<R, TetherError>,
    ) -> Result<R, TetherError> {
        self.with(f)?
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_provisioned(&self) -> bool {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Empty the slot, returning what it held.
    pub fn take(&self) -> Option<Arc<T>> {
        self.slot.write().unwrap_or_else(|e| e.into_inner()).take()
    }

    /// Empty the slot, running `f` on the component if there was one.
    pub fn close<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.take().map(|c| f(&c))
    }
}

impl<T> Default for Holder<T> {
    fn default() -> Self {
        Self::new()
    }
}
