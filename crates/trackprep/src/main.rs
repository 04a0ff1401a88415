//! `trackprep` - CLI for the tracking data preparation pipeline.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use trackprep::catalog;
use trackprep::check::check_file;
use trackprep::cli::{CheckCommand, Cli, ColumnsCommand, Command, ConfigCommand, ProcessCommand};
use trackprep::{init_logging, load_data, save, Config, Pipeline};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Process(cmd) => handle_process(config, &cmd),
        Command::Columns(cmd) => handle_columns(&cmd),
        Command::Check(cmd) => handle_check(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_process(config: Config, cmd: &ProcessCommand) -> anyhow::Result<ExitCode> {
    let config = cmd.apply(config);
    config.validate()?;

    info!("Starting data processing");
    let frame = load_data(&config.input.data_dir)
        .with_context(|| format!("loading data from {}", config.input.data_dir.display()))?;
    let (frame, report) = Pipeline::new(&config.processing()).run(frame)?;
    let saved = save(&frame, &config.output)?;
    info!("Data processing completed");

    if cmd.json {
        let out = serde_json::json!({ "report": report, "outputs": saved });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Processing Summary");
    println!("==================");
    println!();
    println!(
        "  Input:              {} rows x {} columns",
        report.input_rows, report.input_columns
    );
    println!(
        "  Output:             {} rows x {} columns",
        report.output_rows, report.output_columns
    );
    println!("  Unparsed dates:     {}", report.unparsed_dates);
    for (column, count) in &report.mode_filled {
        println!("  Mode-filled:        {column} ({count})");
    }
    for (column, count) in &report.knn_filled {
        println!("  KNN-filled:         {column} ({count})");
    }
    for group in &report.encoded {
        println!(
            "  Encoded:            {} -> {} indicator(s)",
            group.source,
            group.levels.len() + 1
        );
    }
    println!();
    if let Some(path) = &saved.csv {
        println!("  CSV:                {}", path.display());
    }
    if let Some(path) = &saved.sqlite {
        println!("  SQLite:             {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_columns(cmd: &ColumnsCommand) -> anyhow::Result<ExitCode> {
    if cmd.json {
        let out = serde_json::json!({
            "categories": catalog::catalog(),
            "glossary": catalog::glossary(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", catalog::render_markdown());
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<ExitCode> {
    let report = check_file(&cmd.file, &config.processing.categorical_columns)
        .with_context(|| format!("checking {}", cmd.file.display()))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Checked {} rows in {}", report.rows, cmd.file.display());
        for group in &report.groups {
            let status = if group.is_valid() { "ok" } else { "FAILED" };
            println!(
                "  {:<16} {:<7} levels: {}",
                group.source,
                status,
                group.levels.join(", ")
            );
            if !group.undocumented.is_empty() {
                println!("    undocumented: {}", group.undocumented.join(", "));
            }
            if !group.ignored.is_empty() {
                println!("    ignored: {}", group.ignored.join(", "));
            }
            for violation in &group.violations {
                println!("    row {}: {}", violation.row, violation.reason);
            }
            if group.violation_count > group.violations.len() {
                println!(
                    "    ... and {} more",
                    group.violation_count - group.violations.len()
                );
            }
        }
        for source in &report.missing_groups {
            println!("  {source:<16} missing");
        }
    }

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Input]");
                println!("  Data directory:     {}", config.input.data_dir.display());
                println!("  Date format:        {}", config.input.date_format);
                println!();
                println!("[Colony]");
                println!("  Latitude:           {}", config.colony.latitude);
                println!("  Longitude:          {}", config.colony.longitude);
                println!();
                println!("[Processing]");
                println!(
                    "  Categorical:        {}",
                    config.processing.categorical_columns.join(", ")
                );
                println!("  KNN neighbours:     {}", config.processing.knn_neighbors);
                println!(
                    "  Scaled:             {}",
                    config.processing.scale_columns.join(", ")
                );
                println!();
                println!("[Output]");
                println!("  Output directory:   {}", config.output.output_dir.display());
                println!("  File stem:          {}", config.output.file_stem);
                println!("  CSV:                {}", config.output.write_csv);
                println!("  SQLite:             {}", config.output.write_sqlite);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
