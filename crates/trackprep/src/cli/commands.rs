//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::Config;

/// Process command arguments.
#[derive(Debug, Args)]
pub struct ProcessCommand {
    /// Directory containing raw `*.csv` files
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for processed output
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name without extension
    #[arg(short, long, value_name = "STEM")]
    pub name: Option<String>,

    /// Do not write the CSV output
    #[arg(long)]
    pub no_csv: bool,

    /// Do not write the SQLite output
    #[arg(long)]
    pub no_sqlite: bool,

    /// Print the run report as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl ProcessCommand {
    /// Apply command-line overrides on top of the loaded configuration.
    #[must_use]
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.data_dir {
            config.input.data_dir.clone_from(dir);
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir.clone_from(dir);
        }
        if let Some(name) = &self.name {
            config.output.file_stem.clone_from(name);
        }
        if self.no_csv {
            config.output.write_csv = false;
        }
        if self.no_sqlite {
            config.output.write_sqlite = false;
        }
        config
    }
}

/// Columns command arguments.
#[derive(Debug, Args)]
pub struct ColumnsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Processed CSV file to verify
    pub file: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
