// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability classification.
//!
//! Decides which roles a service plays from its declared markers and its
//! runtime capabilities. Roles are evaluated independently: a type can be an
//! endpoint, a provider and a feature at the same time. Malformed metadata
//! never produces an error, it only removes the affected role.

use tether_core::{CapabilityDescriptor, MethodDecl, MethodMarker, Service, TypeDecl, TypeMarker};

/// A role a tracked service plays for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Routable resource, with one descriptor per verb-marked method.
    Endpoint(Vec<CapabilityDescriptor>),
    Provider,
    FeatureExtension,
}

/// Outcome of classifying one service. No roles means not applicable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    roles: Vec<Role>,
}

impl Classification {
    pub fn not_applicable() -> Self {
        Self::default()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Whether at least one role applies.
    pub fn is_applicable(&self) -> bool {
        !self.roles.is_empty()
    }

    pub fn is_endpoint(&self) -> bool {
        self.roles.iter().any(|r| matches!(r, Role::Endpoint(_)))
    }

    /// Endpoint descriptors; empty when the service is not an endpoint.
    pub fn descriptors(&self) -> &[CapabilityDescriptor] {
        self.roles
            .iter()
            .find_map(|r| match r {
                Role::Endpoint(d) => Some(d.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn is_provider(&self) -> bool {
        self.roles.contains(&Role::Provider)
    }

    pub fn is_feature(&self) -> bool {
        self.roles.contains(&Role::FeatureExtension)
    }
}

/// Classify a service instance against its declared type metadata.
pub fn classify(decl: &TypeDecl, instance: &dyn Service) -> Classification {
    let mut roles = Vec::new();
    if let Some(descriptors) = endpoint_descriptors(decl) {
        roles.push(Role::Endpoint(descriptors));
    }
    if decl.markers().contains(&TypeMarker::Provider) {
        roles.push(Role::Provider);
    }
    if instance.as_feature().is_some() {
        roles.push(Role::FeatureExtension);
    }
    Classification { roles }
}

/// Classify a service using its own declaration.
pub fn classify_service(service: &dyn Service) -> Classification {
    classify(service.declaration(), service)
}

/// The type's route root, if it declares exactly one non-blank root.
pub fn route_root(decl: &TypeDecl) -> Option<&str> {
    let mut roots = decl.markers().iter().filter_map(|m| match m {
        TypeMarker::Path(p) => Some(p.as_str()),
        TypeMarker::Provider => None,
    });
    let root = roots.next()?;
    if roots.next().is_some() || root.trim().is_empty() {
        return None;
    }
    Some(root)
}

/// Descriptors for every verb-marked method, or `None` when the type has no
/// usable route root.
pub fn endpoint_descriptors(decl: &TypeDecl) -> Option<Vec<CapabilityDescriptor>> {
    let root = route_root(decl)?;
    Some(
        decl.methods()
            .iter()
            .filter_map(|m| method_descriptor(root, m))
            .collect(),
    )
}

fn method_descriptor(root: &str, method: &MethodDecl) -> Option<CapabilityDescriptor> {
    let mut verbs = Vec::new();
    let mut paths = Vec::new();
    let mut accept = Vec::new();
    let mut respond = Vec::new();

    for marker in method.markers() {
        match marker {
            MethodMarker::Verb(v) => verbs.push(*v),
            MethodMarker::Path(p) => paths.push(p.as_str()),
            MethodMarker::Consumes(types) => accept.extend(types.iter().cloned()),
            MethodMarker::Produces(types) => respond.extend(types.iter().cloned()),
        }
    }

    let [verb] = verbs.as_slice() else {
        return None;
    };
    let path = match paths.as_slice() {
        [] => root.to_string(),
        [sub] => format!("{root}/{sub}"),
        _ => return None,
    };
    Some(CapabilityDescriptor::new(path, *verb, accept, respond))
}
