// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declared capability metadata for tracked services.
//!
//! A service describes itself through a [`TypeDecl`]: the markers on its type
//! (route root, extension provider) and the markers on each of its methods
//! (verb, sub-path, consumed and produced content types). Feature support is
//! a runtime capability of the instance, queried through
//! [`Service::as_feature`].

use crate::types::{Properties, Verb};

/// A marker declared on a service type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMarker {
    /// Route root: the path prefix every endpoint method hangs off.
    Path(String),
    /// The type is an extension provider for the dispatcher.
    Provider,
}

/// A marker declared on a service method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMarker {
    Verb(Verb),
    /// Sub-path appended to the type's route root.
    Path(String),
    /// Content types the method accepts.
    Consumes(Vec<String>),
    /// Content types the method responds with.
    Produces(Vec<String>),
}

/// Declared metadata of one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    name: String,
    markers: Vec<MethodMarker>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
        }
    }

    pub fn marker(mut self, marker: MethodMarker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn verb(self, verb: Verb) -> Self {
        self.marker(MethodMarker::Verb(verb))
    }

    pub fn get(self) -> Self {
        self.verb(Verb::Get)
    }

    pub fn post(self) -> Self {
        self.verb(Verb::Post)
    }

    pub fn put(self) -> Self {
        self.verb(Verb::Put)
    }

    pub fn delete(self) -> Self {
        self.verb(Verb::Delete)
    }

    pub fn path(self, path: impl Into<String>) -> Self {
        self.marker(MethodMarker::Path(path.into()))
    }

    pub fn consumes<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.marker(MethodMarker::Consumes(
            types.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn produces<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.marker(MethodMarker::Produces(
            types.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &[MethodMarker] {
        &self.markers
    }
}

/// Declared metadata of a service type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    name: String,
    markers: Vec<TypeMarker>,
    methods: Vec<MethodDecl>,
    interfaces: Vec<String>,
}

impl TypeDecl {
    /// Start a declaration for the type with the given fully qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
            methods: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    pub fn marker(mut self, marker: TypeMarker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Declare the route root.
    pub fn path(self, path: impl Into<String>) -> Self {
        self.marker(TypeMarker::Path(path.into()))
    }

    /// Declare the type as an extension provider.
    pub fn provider(self) -> Self {
        self.marker(TypeMarker::Provider)
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Record an interface the type implements (shown by the console).
    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &[TypeMarker] {
        &self.markers
    }

    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }
}

/// Mutable view handed to features while the dispatcher configuration is built.
#[derive(Debug, Clone, Default)]
pub struct FeatureContext {
    properties: Properties,
}

impl FeatureContext {
    pub fn new(properties: Properties) -> Self {
        Self { properties }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn into_properties(self) -> Properties {
        self.properties
    }
}

/// Feature extension capability.
pub trait Feature: Send + Sync {
    /// Apply the feature to the dispatcher configuration.
    ///
    /// Returns `true` if the feature enabled itself.
    fn configure(&self, context: &mut FeatureContext) -> bool;
}

/// An object published into the registry.
pub trait Service: Send + Sync + 'static {
    /// Declared type metadata.
    fn declaration(&self) -> &TypeDecl;

    /// Feature capability of this instance, if it has one.
    fn as_feature(&self) -> Option<&dyn Feature> {
        None
    }
}

impl std::fmt::Debug for dyn Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("type", &self.declaration().name())
            .field("feature", &self.as_feature().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declaration_order() {
        let decl = TypeDecl::new("app.Users")
            .path("/users")
            .interface("app.Lookup")
            .method(MethodDecl::new("list").get())
            .method(
                MethodDecl::new("create")
                    .post()
                    .consumes(["application/json"])
                    .produces(["application/json"]),
            );

        assert_eq!(decl.name(), "app.Users");
        assert_eq!(decl.markers(), &[TypeMarker::Path("/users".into())]);
        assert_eq!(decl.methods().len(), 2);
        assert_eq!(decl.methods()[1].name(), "create");
        assert_eq!(
            decl.methods()[1].markers(),
            &[
                MethodMarker::Verb(Verb::Post),
                MethodMarker::Consumes(vec!["application/json".into()]),
                MethodMarker::Produces(vec!["application/json".into()]),
            ]
        );
        assert_eq!(decl.interfaces(), &["app.Lookup".to_string()]);
    }

    #[test]
    fn feature_context_properties() {
        let mut ctx = FeatureContext::default();
        assert_eq!(ctx.property("sse.enabled"), None);
        ctx.set_property("sse.enabled", "true");
        assert_eq!(ctx.property("sse.enabled"), Some("true"));
        assert_eq!(ctx.into_properties().len(), 1);
    }
}
