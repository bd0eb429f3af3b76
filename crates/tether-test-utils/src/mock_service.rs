// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock service objects.

use std::sync::Arc;

use tether_core::{Feature, FeatureContext, MethodDecl, Service, TypeDecl};

struct MockFeature {
    property: String,
    enable: bool,
}

impl Feature for MockFeature {
    fn configure(&self, context: &mut FeatureContext) -> bool {
        if self.enable {
            context.set_property(self.property.clone(), "true");
        }
        self.enable
    }
}

/// A service whose declaration is supplied by the test.
pub struct MockService {
    decl: TypeDecl,
    feature: Option<MockFeature>,
}

impl MockService {
    pub fn new(decl: TypeDecl) -> Self {
        Self {
            decl,
            feature: None,
        }
    }

    /// A type with no markers at all; never tracked.
    pub fn plain(name: &str) -> Self {
        Self::new(TypeDecl::new(name))
    }

    /// An endpoint with a single GET method on its route root.
    pub fn endpoint(name: &str, path: &str) -> Self {
        Self::new(
            TypeDecl::new(name)
                .path(path)
                .method(MethodDecl::new("get").get()),
        )
    }

    /// An extension provider.
    pub fn provider(name: &str) -> Self {
        Self::new(TypeDecl::new(name).provider())
    }

    /// A feature that sets `<name>.enabled = true` when configured.
    pub fn feature(name: &str) -> Self {
        Self::plain(name).with_feature(true)
    }

    /// Attach a feature capability to this instance.
    pub fn with_feature(mut self, enable: bool) -> Self {
        self.feature = Some(MockFeature {
            property: format!("{}.enabled", self.decl.name()),
            enable,
        });
        self
    }

    pub fn into_arc(self) -> Arc<dyn Service> {
        Arc::new(self)
    }
}

impl Service for MockService {
    fn declaration(&self) -> &TypeDecl {
        &self.decl
    }

    fn as_feature(&self) -> Option<&dyn Feature> {
        self.feature.as_ref().map(|f| f as &dyn Feature)
    }
}
