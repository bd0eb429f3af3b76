// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notification hub.
//!
//! Subscribers are zero-argument callbacks. A notification invokes every
//! callback registered at the moment the list is copied, after the mapping
//! lock has been released, so callbacks may subscribe or unsubscribe freely.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use tether_core::{BoxError, TetherError};

use crate::recording;

/// Token returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

pub type Callback = Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

/// Result of one [`ChangeNotifier::notify_changed`] call.
#[derive(Debug, Default)]
pub struct NotifyReport {
    /// Number of callbacks invoked.
    pub invoked: usize,
    /// One [`TetherError::Subscriber`] per callback that failed or panicked.
    pub failures: Vec<TetherError>,
}

impl NotifyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<HashMap<SubscriptionId, Callback>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let id = SubscriptionId::fresh();
        self.lock().insert(id, Arc::new(callback));
        id
    }

    /// Remove a subscription. Returns `false` for unknown ids.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Invoke every current subscriber exactly once.
    pub fn notify_changed(&self) -> NotifyReport {
        let callbacks: Vec<(SubscriptionId, Callback)> = self
            .lock()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        recording::record_notification();
        let mut report = NotifyReport {
            invoked: callbacks.len(),
            failures: Vec::new(),
        };
        for (id, callback) in callbacks {
            let message = match catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };
            recording::record_subscriber_failure();
            report.failures.push(TetherError::Subscriber {
                id: id.to_string(),
                message,
            });
        }
        report
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SubscriptionId, Callback>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
