// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stockroom - external catalog import service.
//!
//! This is the binary entry point.

mod plugins;
mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stockroom_config::StockroomConfig;

/// Stockroom - import external catalog records into a home inventory.
#[derive(Parser, Debug)]
#[command(name = "stockroom", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// List compiled-in import plugins and their status.
    Plugins,
    /// Manage Stockroom configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration, reporting every problem found.
    Check {
        /// Check this file instead of the standard search path.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn load_config(path: Option<&std::path::Path>) -> Option<StockroomConfig> {
    let result = match path {
        Some(path) => stockroom_config::load_and_validate_path(path),
        None => stockroom_config::load_and_validate(),
    };
    match result {
        Ok(config) => Some(config),
        Err(errors) => {
            stockroom_config::render_errors(&errors);
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => {
            let Some(config) = load_config(None) else {
                return ExitCode::FAILURE;
            };
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
        Some(Commands::Plugins) => {
            let Some(config) = load_config(None) else {
                return ExitCode::FAILURE;
            };
            let registry = plugins::build_registry(plugins::compiled_plugins(), &config);
            print!("{}", plugins::render_listing(&registry));
        }
        Some(Commands::Config {
            action: ConfigCommand::Check { path },
        }) => {
            let Some(config) = load_config(path.as_deref()) else {
                return ExitCode::FAILURE;
            };
            println!(
                "stockroom: configuration OK (gateway {}:{}, {} plugin override(s))",
                config.gateway.host,
                config.gateway.port,
                config.plugins.len()
            );
        }
        None => {
            println!("stockroom: use --help for available commands");
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_check_accepts_path() {
        let cli = Cli::try_parse_from(["stockroom", "config", "check", "--path", "/tmp/s.toml"])
            .unwrap();
        match cli.command {
            Some(Commands::Config {
                action: ConfigCommand::Check { path },
            }) => assert_eq!(path.unwrap(), PathBuf::from("/tmp/s.toml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = stockroom_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.gateway.port, 3000);
    }
}
