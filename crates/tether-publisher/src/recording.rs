// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a
//! no-op.

use metrics::{describe_counter, describe_gauge};

/// Register all Tether metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_gauge!("tether_registry_entries", "Services currently tracked");
    describe_counter!(
        "tether_notifications_total",
        "Change notifications delivered to subscribers"
    );
    describe_counter!(
        "tether_subscriber_failures_total",
        "Subscriber callbacks that failed or panicked"
    );
    describe_counter!("tether_reloads_total", "Dispatcher reloads by outcome");
}

pub fn set_registry_entries(count: usize) {
    metrics::gauge!("tether_registry_entries").set(count as f64);
}

pub fn record_notification() {
    metrics::counter!("tether_notifications_total").increment(1);
}

pub fn record_subscriber_failure() {
    metrics::counter!("tether_subscriber_failures_total").increment(1);
}

/// Record a dispatcher reload; `outcome` is `"ok"` or `"error"`.
pub fn record_reload(outcome: &'static str) {
    metrics::counter!("tether_reloads_total", "outcome" => outcome).increment(1);
}
