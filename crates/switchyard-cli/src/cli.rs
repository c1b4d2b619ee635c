//! Command line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Top-level argument parser for the `switchyard` binary.
#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Event-driven automation: triggers, agents, and outputs wired by workflows")]
#[command(version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run workflows from a config file until interrupted
    Run {
        /// YAML config file with a `workflows:` list
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Interactive manual trigger session for testing workflows
    Manual,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_requires_a_config_path() {
        let cli = Cli::try_parse_from(["switchyard", "run", "--config", "flows.yaml"]).unwrap();
        match cli.command {
            Commands::Run { config } => assert_eq!(config, PathBuf::from("flows.yaml")),
            Commands::Manual => panic!("parsed the wrong subcommand"),
        }

        assert!(Cli::try_parse_from(["switchyard", "run"]).is_err());
    }

    #[test]
    fn log_level_is_global_and_optional() {
        let cli = Cli::try_parse_from(["switchyard", "manual"]).unwrap();
        assert_eq!(cli.log_level, None);

        let cli = Cli::try_parse_from(["switchyard", "manual", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));

        let cli = Cli::try_parse_from(["switchyard", "-l", "trace", "run", "-c", "x.yaml"]).unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Trace));

        assert!(Cli::try_parse_from(["switchyard", "manual", "-l", "loud"]).is_err());
    }

    #[test]
    fn log_levels_map_onto_tracing_filters() {
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::OFF);
        assert_eq!(LevelFilter::from(LogLevel::Info), LevelFilter::INFO);
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
    }

    #[test]
    fn bare_invocation_is_rejected() {
        assert!(Cli::try_parse_from(["switchyard"]).is_err());
    }
}
