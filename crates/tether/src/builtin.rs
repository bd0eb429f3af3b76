// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Services and dispatcher shipped with the binary.

use std::sync::Arc;

use tracing::info;

use tether_core::{
    Dispatcher, MethodDecl, Properties, Service, ServiceSource, SingletonSet, TetherError,
    TypeDecl,
};
use tether_bus::ServiceBus;
use tether_config::TetherConfig;
use tether_publisher::Publisher;

/// Liveness resource mounted under the publisher path.
pub struct HealthResource {
    decl: TypeDecl,
}

impl HealthResource {
    pub const TYPE_NAME: &'static str = "tether.builtin.HealthResource";

    pub fn new(mount_path: &str) -> Self {
        Self {
            decl: TypeDecl::new(Self::TYPE_NAME).path(mount_path).method(
                MethodDecl::new("health")
                    .get()
                    .path("health")
                    .produces(["text/plain"]),
            ),
        }
    }
}

impl Service for HealthResource {
    fn declaration(&self) -> &TypeDecl {
        &self.decl
    }
}

/// Dispatcher that only logs what it would serve.
#[derive(Debug, Default)]
pub struct LoggingDispatcher;

impl Dispatcher for LoggingDispatcher {
    fn reload(&self, singletons: &SingletonSet) -> Result<(), TetherError> {
        let names: Vec<&str> = singletons
            .services
            .iter()
            .map(|s| s.declaration().name())
            .collect();
        info!(
            services = ?names,
            properties = ?singletons.properties,
            features = ?singletons.enabled_features,
            "singleton set reloaded"
        );
        Ok(())
    }
}

/// A bus with the built-in services and an active publisher on top of it.
pub struct Runtime {
    pub bus: Arc<ServiceBus>,
    pub publisher: Arc<Publisher>,
}

impl Runtime {
    pub fn boot(config: &TetherConfig) -> Result<Self, TetherError> {
        let bus = Arc::new(ServiceBus::with_scan_ignore(
            config.publisher.scan_ignore_property.clone(),
        ));
        if config.publisher.health_endpoint {
            bus.register(
                Arc::new(HealthResource::new(&config.publisher.path)),
                Properties::new(),
            );
        }

        let publisher = Publisher::builder(
            Arc::clone(&bus) as Arc<dyn ServiceSource>,
            Arc::new(LoggingDispatcher),
        )
        .path(config.publisher.path.clone())
        .inhibit_start(config.publisher.inhibit_start)
        .build();
        publisher.activate()?;

        Ok(Self { bus, publisher })
    }

    pub fn shutdown(&self) {
        self.publisher.deactivate();
    }
}
