// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::TetherConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check semantic constraints serde cannot express.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &TetherConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.logging.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.log_level `{}` is not one of {}",
            config.logging.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let path = &config.publisher.path;
    if !path.starts_with('/') {
        fail(format!("publisher.path `{path}` must start with `/`"));
    } else if path.len() > 1 && path.ends_with('/') {
        fail(format!("publisher.path `{path}` must not end with `/`"));
    }

    if config.publisher.scan_ignore_property.trim().is_empty() {
        fail("publisher.scan_ignore_property must not be empty".to_string());
    }

    let label = config.console.label.trim();
    if label.is_empty() {
        fail("console.label must not be empty".to_string());
    } else if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        fail(format!(
            "console.label `{label}` may only contain letters, digits, `-` and `_`"
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if config.gateway.port == 0 {
        fail("gateway.port must be non-zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
