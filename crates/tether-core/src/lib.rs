// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tether endpoint publisher.
//!
//! Defines the error type, the handle and descriptor types, and the traits at
//! every seam of the system: the capability metadata services declare, the
//! event source they are tracked from, and the dispatcher that is reloaded
//! when the tracked set changes.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BoxError, TetherError};
pub use types::{CapabilityDescriptor, Handle, Properties, Verb};

pub use traits::{
    Dispatcher, DocsGenerator, EndpointViews, Feature, FeatureContext, ListenerId, MethodDecl,
    MethodMarker, Service, ServiceEvent, ServiceListener, ServiceSource, SingletonSet, TypeDecl,
    TypeMarker,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_boundary_traits_are_exported() {
        fn _assert_service<T: Service>() {}
        fn _assert_feature<T: Feature>() {}
        fn _assert_source<T: ServiceSource>() {}
        fn _assert_listener<T: ServiceListener>() {}
        fn _assert_dispatcher<T: Dispatcher>() {}
        fn _assert_docs<T: DocsGenerator>() {}
    }

    #[test]
    fn closures_are_listeners() {
        use std::sync::Mutex;

        let seen = Mutex::new(Vec::new());
        let listener = |event: ServiceEvent| seen.lock().unwrap().push(event.handle());
        listener.service_changed(ServiceEvent::Registered(Handle(1)));
        listener.service_changed(ServiceEvent::Unregistering(Handle(1)));
        assert_eq!(*seen.lock().unwrap(), vec![Handle(1), Handle(1)]);
    }

    #[test]
    fn empty_singleton_set() {
        let set = SingletonSet::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(format!("{set:?}").contains("SingletonSet"));
    }
}
