//! Command-line interface for trackprep.
//!
//! This module provides the CLI structure for the `trackprep` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{CheckCommand, ColumnsCommand, ConfigCommand, ProcessCommand};

/// trackprep - Prepare penguin satellite-tracking data
///
/// Loads raw tracking CSV files, fills gaps, derives colony distance and
/// calendar features, and one-hot encodes sex, age, breeding stage and
/// Argos quality.
#[derive(Debug, Parser)]
#[command(name = "trackprep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load, process and save tracking data
    Process(ProcessCommand),

    /// Describe the encoded indicator columns
    Columns(ColumnsCommand),

    /// Verify the indicator groups of a processed CSV file
    Check(CheckCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "trackprep");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["trackprep", "columns"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["trackprep", "-v", "columns"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["trackprep", "-vv", "columns"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["trackprep", "-q", "-v", "columns"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_process() {
        let cli = parse(&[
            "trackprep",
            "process",
            "--data-dir",
            "raw",
            "-o",
            "out",
            "--name",
            "run1",
            "--no-sqlite",
            "--json",
        ]);
        let Command::Process(cmd) = cli.command else {
            panic!("expected process command");
        };
        assert_eq!(cmd.data_dir, Some(PathBuf::from("raw")));
        assert_eq!(cmd.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cmd.name.as_deref(), Some("run1"));
        assert!(cmd.no_sqlite);
        assert!(!cmd.no_csv);
        assert!(cmd.json);
    }

    #[test]
    fn test_parse_check_requires_file() {
        assert!(Cli::try_parse_from(["trackprep", "check"]).is_err());
        let cli = parse(&["trackprep", "check", "processed.csv"]);
        assert!(matches!(cli.command, Command::Check(ref c) if c.file == PathBuf::from("processed.csv")));
    }

    #[test]
    fn test_parse_config_subcommands() {
        let cli = parse(&["trackprep", "config", "show", "--json"]);
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Show { json: true })));

        let cli = parse(&["trackprep", "config", "validate", "-f", "x.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli = parse(&["trackprep", "columns", "-c", "/custom/config.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
