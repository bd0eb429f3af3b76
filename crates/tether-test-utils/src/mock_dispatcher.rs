// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher double that records reloads.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tether_core::{Dispatcher, SingletonSet, TetherError};

/// Captures every singleton set it is asked to reload.
#[derive(Default)]
pub struct RecordingDispatcher {
    reloads: Mutex<Vec<SingletonSet>>,
    failing: AtomicBool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reloads fail (they are still recorded).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.lock().unwrap().len()
    }

    /// The most recent singleton set.
    pub fn last(&self) -> Option<SingletonSet> {
        self.reloads.lock().unwrap().last().cloned()
    }

    /// Type names of the services in the most recent reload.
    pub fn last_names(&self) -> Vec<String> {
        self.last()
            .map(|set| {
                set.services
                    .iter()
                    .map(|s| s.declaration().name().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn reload(&self, singletons: &SingletonSet) -> Result<(), TetherError> {
        self.reloads.lock().unwrap().push(singletons.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(TetherError::Dispatcher {
                message: "reload refused".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}
