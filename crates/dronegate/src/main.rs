// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dronegate - multi-vendor drone-cloud integration gateway.
//!
//! This is the binary entry point.

mod plugins;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dronegate_config::DroneGateConfig;

/// Dronegate - multi-vendor drone-cloud integration gateway.
#[derive(Parser, Debug)]
#[command(name = "dronegate", version, about, long_about = None)]
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
    /// Start the gateway and keep enabled vendors connected.
    Serve,
    /// List registered vendors and the built-in vendor catalog.
    Plugins {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Only show catalog entries matching this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Validate configuration and exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let loaded = match &cli.config {
        Some(path) => dronegate_config::load_and_validate_path(path),
        None => dronegate_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            dronegate_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Plugins { json, search }) => plugins::run_plugins(&config, json, search.as_deref()),
        Some(Commands::Check) => {
            println!("{}", check_summary(&config));
            Ok(())
        }
        None => {
            println!("dronegate: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("dronegate: {e}");
        std::process::exit(1);
    }
}

fn check_summary(config: &DroneGateConfig) -> String {
    let enabled = if config.plugins.enabled.is_empty() {
        "none".to_string()
    } else {
        config.plugins.enabled.join(", ")
    };
    format!(
        "dronegate: configuration OK (enabled vendors: {enabled}, language={}, request timeout {}s)",
        config.gateway.language, config.gateway.request_timeout_secs
    )
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["dronegate", "plugins", "--json", "--config", "gw.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("gw.toml")));
        match cli.command {
            Some(Commands::Plugins { json, search }) => {
                assert!(json);
                assert!(search.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = dronegate_config::load_and_validate_str("").expect("default config should be valid");
        let summary = check_summary(&config);
        assert!(summary.contains("enabled vendors: none"));
        assert!(summary.contains("language=zh"));
    }
}
