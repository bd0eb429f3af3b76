// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability and boundary traits.

pub mod dispatcher;
pub mod service;
pub mod source;

pub use dispatcher::{Dispatcher, DocsGenerator, EndpointViews, SingletonSet};
pub use service::{
    Feature, FeatureContext, MethodDecl, MethodMarker, Service, TypeDecl, TypeMarker,
};
pub use source::{ListenerId, ServiceEvent, ServiceListener, ServiceSource};
