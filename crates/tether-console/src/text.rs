// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text listings for the command line.

use std::fmt::Write;

use tether_publisher::Publisher;

/// Every endpoint type followed by its tab-indented descriptors.
pub fn render_endpoints(publisher: &Publisher) -> String {
    let mut out = String::from("Endpoint mappings:\n");
    for (name, descriptors) in publisher.endpoint_views() {
        let _ = writeln!(out, "{name}");
        for d in descriptors {
            let _ = writeln!(out, "\t{d}");
        }
    }
    out
}

/// Every provider with the interfaces its type declares.
pub fn render_providers(publisher: &Publisher) -> String {
    let mut out = String::from("Providers:\n");
    for provider in publisher.provider_instances() {
        let decl = provider.declaration();
        let _ = writeln!(out, "{} with the following interfaces:", decl.name());
        for interface in decl.interfaces() {
            let _ = writeln!(out, "\t{interface}");
        }
    }
    out
}

pub fn render_features(publisher: &Publisher) -> String {
    let mut out = String::from("Features:\n");
    for feature in publisher.feature_instances() {
        let _ = writeln!(out, "{}", feature.declaration().name());
    }
    out
}
