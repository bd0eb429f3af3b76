// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./tether.toml` > `~/.config/tether/tether.toml` > `/etc/tether/tether.toml`,
//! with `TETHER_` environment variables overriding every file.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TetherConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/tether/tether.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tether.toml";

/// Per-user configuration file under the XDG config directory, if one is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tether").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tether/tether.toml`
/// 3. `~/.config/tether/tether.toml`
/// 4. `./tether.toml`
/// 5. `TETHER_*` environment variables
pub fn load_config() -> Result<TetherConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<TetherConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TetherConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, still honoring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<TetherConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TetherConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TetherConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `TETHER_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after the section name becomes a dot, so
/// `TETHER_PUBLISHER_INHIBIT_START` maps to `publisher.inhibit_start`.
fn env_provider() -> Env {
    Env::prefixed("TETHER_").map(|key| {
        // figment keeps the variable's case; fields are lowercase
        let key_str = key.as_str().to_ascii_lowercase();
        for section in ["logging", "publisher", "console", "gateway"] {
            if let Some(field) = key_str
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
            {
                return format!("{section}.{field}").into();
            }
        }
        key_str.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_local_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
[publisher]
path = "/from-file"
"#,
            )?;
            jail.set_env("TETHER_PUBLISHER_INHIBIT_START", "true");
            jail.set_env("TETHER_GATEWAY_PORT", "9000");

            let config = load_config()?;
            assert_eq!(config.publisher.path, "/from-file");
            assert!(config.publisher.inhibit_start);
            assert_eq!(config.gateway.port, 9000);
            Ok(())
        });
    }

    #[test]
    fn env_field_names_with_underscores_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TETHER_LOGGING_LOG_LEVEL", "debug");
            jail.set_env("TETHER_PUBLISHER_SCAN_IGNORE_PROPERTY", "internal");
            jail.set_env("TETHER_CONSOLE_LABEL", "jaxrs");

            let config = load_config()?;
            assert_eq!(config.logging.log_level, "debug");
            assert_eq!(config.publisher.scan_ignore_property, "internal");
            assert_eq!(config.console.label, "jaxrs");
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_loaded() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[console]\nlabel = \"jax\"\n")?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.console.label, "jax");
            assert_eq!(config.publisher.path, "/services");
            Ok(())
        });
    }

    #[test]
    fn from_str_ignores_environment() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TETHER_PUBLISHER_PATH", "/env");
            let config = load_config_from_str("")?;
            assert_eq!(config.publisher.path, "/services");
            Ok(())
        });
    }
}
