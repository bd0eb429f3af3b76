// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level Tether configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TetherConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Endpoint publisher settings.
    #[serde(default)]
    pub publisher: PublisherConfig,

    /// Diagnostics console settings.
    #[serde(default)]
    pub console: ConsoleConfig,

    /// HTTP listener for the console and health routes.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level for the `tether` targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Endpoint publisher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PublisherConfig {
    /// Mount path the dispatcher serves tracked endpoints from.
    #[serde(default = "default_path")]
    pub path: String,

    /// Skip activation entirely (the publisher stays dormant).
    #[serde(default)]
    pub inhibit_start: bool,

    /// Registration property that hides a service from tracking.
    #[serde(default = "default_scan_ignore_property")]
    pub scan_ignore_property: String,

    /// Register the built-in health resource at startup.
    #[serde(default = "default_true")]
    pub health_endpoint: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            inhibit_start: false,
            scan_ignore_property: default_scan_ignore_property(),
            health_endpoint: true,
        }
    }
}

fn default_path() -> String {
    "/services".to_string()
}

fn default_scan_ignore_property() -> String {
    "jaxSkip".to_string()
}

fn default_true() -> bool {
    true
}

/// Diagnostics console configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Serve the console routes.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// URL segment the console is mounted under.
    #[serde(default = "default_label")]
    pub label: String,

    /// Page title.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: default_label(),
            title: default_title(),
        }
    }
}

fn default_label() -> String {
    "tether".to_string()
}

fn default_title() -> String {
    "Tether".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8181
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TetherConfig::default();
        assert_eq!(config.logging.log_level, "info");
        assert_eq!(config.publisher.path, "/services");
        assert!(!config.publisher.inhibit_start);
        assert_eq!(config.publisher.scan_ignore_property, "jaxSkip");
        assert!(config.publisher.health_endpoint);
        assert!(config.console.enabled);
        assert_eq!(config.console.label, "tether");
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 8181);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: TetherConfig = toml::from_str("[publisher]\npath = \"/api\"\n").unwrap();
        assert_eq!(config.publisher.path, "/api");
        assert_eq!(config.publisher.scan_ignore_property, "jaxSkip");
        assert!(config.publisher.health_endpoint);
    }
}
