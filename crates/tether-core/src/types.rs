// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, the event sources, and the console.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Opaque identity of one service registration.
///
/// A handle is unique per registration event and stays stable for the
/// lifetime of that registration. Re-registering the same object yields a
/// new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(pub u64);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registration properties attached to a service (string keys and values).
pub type Properties = BTreeMap<String, String>;

/// HTTP verbs an endpoint method can be marked with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
}

/// Routing metadata for one exposed endpoint operation.
///
/// Built by the classifier from declared markers and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    path: String,
    verb: Verb,
    accept_types: Vec<String>,
    response_types: Vec<String>,
}

impl CapabilityDescriptor {
    pub fn new(
        path: impl Into<String>,
        verb: Verb,
        accept_types: Vec<String>,
        response_types: Vec<String>,
    ) -> Self {
        Self {
            path: path.into(),
            verb,
            accept_types,
            response_types,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Content types the operation consumes, in declaration order.
    pub fn accept_types(&self) -> &[String] {
        &self.accept_types
    }

    /// Content types the operation produces, in declaration order.
    pub fn response_types(&self) -> &[String] {
        &self.response_types
    }
}

impl std::fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "path: {}, verb: {}", self.path, self.verb)?;
        if !self.accept_types.is_empty() {
            write!(f, ", accept: [ {} ]", self.accept_types.join(","))?;
        }
        if !self.response_types.is_empty() {
            write!(f, ", respond: [ {} ]", self.response_types.join(","))?;
        }
        Ok(())
    }
}
