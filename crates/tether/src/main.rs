// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tether - publishes dynamically registered endpoint services.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod builtin;
mod listing;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use tether_config::{ConfigError, TetherConfig};

use crate::listing::Listing;

/// Tether - publishes dynamically registered endpoint services.
#[derive(Parser, Debug)]
#[command(name = "tether", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the publisher and the diagnostics console.
    Serve,
    /// Validate the configuration and report problems.
    CheckConfig,
    /// List tracked endpoints and their operations.
    Endpoints,
    /// List tracked extension providers.
    Providers,
    /// List tracked features.
    Features,
}

fn load(cli: &Cli) -> Result<TetherConfig, Vec<ConfigError>> {
    match &cli.config {
        Some(path) => tether_config::load_and_validate_path(path),
        None => tether_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(errors) => {
            tether_config::render_errors(&errors);
            eprintln!(
                "{} {} configuration error(s)",
                "error:".red().bold(),
                errors.len()
            );
            std::process::exit(1);
        }
    };

    let listing = match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("{} {e}", "error:".red().bold());
                std::process::exit(1);
            }
            return;
        }
        Some(Commands::CheckConfig) => {
            println!(
                "{} publisher at {}, console on {}:{}",
                "config ok:".green().bold(),
                config.publisher.path,
                config.gateway.host,
                config.gateway.port
            );
            return;
        }
        Some(Commands::Endpoints) => Listing::Endpoints,
        Some(Commands::Providers) => Listing::Providers,
        Some(Commands::Features) => Listing::Features,
        None => {
            println!("tether: use --help for available commands");
            return;
        }
    };

    serve::init_tracing(&config.logging.log_level);
    match listing::render(&config, listing) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = tether_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.publisher.path, "/services");
        assert_eq!(config.console.label, "tether");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["tether", "--config", "/tmp/t.toml", "check-config"]);
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));

        let cli = Cli::parse_from(["tether", "endpoints"]);
        assert!(matches!(cli.command, Some(Commands::Endpoints)));
    }
}
