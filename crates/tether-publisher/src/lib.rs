// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic capability registry and dispatcher publisher.
//!
//! Services appear and disappear on a [`ServiceSource`](tether_core::ServiceSource).
//! The [`Tracker`] classifies each one, keeps the [`Registry`] current, and
//! fires the [`ChangeNotifier`]. The [`Publisher`] subscribes to those
//! notifications and reloads the dispatcher with the new singleton set.

pub mod classifier;
pub mod holder;
pub mod notifier;
pub mod publisher;
pub mod recording;
pub mod registry;
pub mod tracker;

pub use classifier::{Classification, Role, classify, classify_service, endpoint_descriptors};
pub use holder::Holder;
pub use notifier::{Callback, ChangeNotifier, NotifyReport, SubscriptionId};
pub use publisher::{
    DEFAULT_PATH, FEATURE_AUTODISCOVERY_DISABLE, METAINF_SERVICES_LOOKUP_DISABLE, Publisher,
    PublisherBuilder, default_properties,
};
pub use registry::{Registry, Snapshot, TrackedEntry};
pub use tracker::{EventOutcome, Tracker, TrackerState};
