//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Where the configuration file is looked up by default.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/calendar/config.yaml";

/// Calendar scheduling service.
#[derive(Debug, Parser)]
#[command(name = "calendar", about = "Calendar scheduling service (HTTP + gRPC)")]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Optional subcommand; without one the service runs.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the program name and version, then exit.
    Version,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_system_config() {
        let cli = Cli::try_parse_from(["calendar"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_config_and_version() {
        let cli = Cli::try_parse_from(["calendar", "--config", "./dev.yaml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./dev.yaml"));

        let cli = Cli::try_parse_from(["calendar", "version"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Version)));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["calendar", "--bogus"]).is_err());
    }
}
