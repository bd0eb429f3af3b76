// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot listing commands (`endpoints`, `providers`, `features`).

use tether_config::TetherConfig;
use tether_core::TetherError;

use crate::builtin::Runtime;

/// Which listing to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Endpoints,
    Providers,
    Features,
}

/// Boot the publisher over the built-in services and render one listing.
pub fn render(config: &TetherConfig, listing: Listing) -> Result<String, TetherError> {
    let runtime = Runtime::boot(config)?;
    let publisher = &runtime.publisher;
    let text = match listing {
        Listing::Endpoints => tether_console::render_endpoints(publisher),
        Listing::Providers => tether_console::render_providers(publisher),
        Listing::Features => tether_console::render_features(publisher),
    };
    runtime.shutdown();
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_listing_shows_health_resource() {
        let text = render(&TetherConfig::default(), Listing::Endpoints).unwrap();
        assert!(text.starts_with("Endpoint mappings:\n"));
        assert!(text.contains("tether.builtin.HealthResource\n"));
        assert!(text.contains("\tpath: /services/health, verb: GET, respond: [ text/plain ]\n"));
    }

    #[test]
    fn providers_listing_is_empty_by_default() {
        let text = render(&TetherConfig::default(), Listing::Providers).unwrap();
        assert_eq!(text, "Providers:\n");
    }
}
