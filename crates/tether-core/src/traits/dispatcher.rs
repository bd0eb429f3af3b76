// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound seams: the request dispatcher that is reloaded on every change,
//! and the optional documentation generator.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::TetherError;
use crate::traits::service::Service;
use crate::types::{CapabilityDescriptor, Properties};

/// Endpoint descriptors keyed by service type name.
pub type EndpointViews = BTreeMap<String, Vec<CapabilityDescriptor>>;

/// Everything the dispatcher serves after a reload.
#[derive(Clone, Default)]
pub struct SingletonSet {
    /// Every tracked service, ordered by handle.
    pub services: Vec<Arc<dyn Service>>,
    /// Dispatcher properties after all features were applied.
    pub properties: Properties,
    /// Type names of features that enabled themselves.
    pub enabled_features: Vec<String>,
}

impl SingletonSet {
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for SingletonSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .services
            .iter()
            .map(|s| s.declaration().name())
            .collect();
        f.debug_struct("SingletonSet")
            .field("services", &names)
            .field("properties", &self.properties)
            .field("enabled_features", &self.enabled_features)
            .finish()
    }
}

/// The request dispatcher whose singleton set follows the registry.
pub trait Dispatcher: Send + Sync {
    /// Re-derive the served set. Called synchronously on every change.
    fn reload(&self, singletons: &SingletonSet) -> Result<(), TetherError>;
}

/// Optional API documentation integration.
pub trait DocsGenerator: Send + Sync {
    fn generate(&self, endpoints: &EndpointViews) -> serde_json::Value;
}
