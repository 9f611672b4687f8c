use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;
use shared_types::{ExtractionContext, ImportedFlights, ReferenceData, SourceFormat};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use extractors::{build_reference_data, write_skylog_csv, ImportDispatcher};

mod config;

use config::ImportConfig;

#[derive(Parser, Debug)]
#[command(
    name = "skylog-import",
    version,
    about = "Import flights from a roster, flight time overview or logbook export"
)]
struct Cli {
    /// Plain-text dump of the document
    input: PathBuf,

    /// Skip detection and read the input as this format
    #[arg(long)]
    format: Option<SourceFormat>,

    /// Config file, instead of the one in the user config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Anchor for dates printed without a year (YYYY-MM-DD)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print the records as a skylog CSV logbook instead of JSON
    #[arg(long)]
    csv: bool,

    #[arg(long)]
    log_file_path: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportOutput<'a> {
    format: SourceFormat,
    #[serde(flatten)]
    imported: &'a ImportedFlights,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file_path.as_deref());

    let (config, config_path) =
        ImportConfig::load(cli.config.as_deref()).context("Failed to load skylog import config")?;
    tracing::debug!("Using config at {:?}", config_path);

    let reference_date = match cli.reference_date {
        Some(date) => date,
        None => config
            .reference_date()
            .with_context(|| format!("Invalid config at {:?}", config_path))?
            .unwrap_or_else(|| Utc::now().date_naive()),
    };
    let reference_data = load_reference_data(&config)?;
    let context = ExtractionContext::new(reference_date).with_reference_data(reference_data);

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input at {:?}", cli.input))?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();

    let dispatcher = ImportDispatcher::new(context);
    let (format, imported) = match cli.format {
        Some(format) => {
            let imported = dispatcher
                .extract_as(format, &lines)
                .with_context(|| format!("Failed to extract {:?} as {}", cli.input, format))?
                .ok_or_else(|| anyhow::anyhow!("{:?} is not a {} document", cli.input, format))?;
            (format, imported)
        }
        None => dispatcher
            .dispatch(&lines)
            .with_context(|| format!("Failed to extract {:?}", cli.input))?
            .ok_or_else(|| anyhow::anyhow!("Unrecognized input format in {:?}", cli.input))?,
    };

    tracing::info!(
        "Imported {} records from {:?} as {}",
        imported.flights().len(),
        cli.input,
        format
    );

    if cli.csv {
        for line in write_skylog_csv(imported.flights()) {
            println!("{line}");
        }
        return Ok(());
    }

    let output = ImportOutput {
        format,
        imported: &imported,
    };
    let json = if cli.pretty || config.pretty() {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");

    Ok(())
}

/// Logs go to stderr so stdout carries only the import result
fn init_tracing(log_file_path: Option<&str>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("skylog-import.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        None
    }
}

fn load_reference_data(config: &ImportConfig) -> Result<ReferenceData> {
    let airports_csv = match config.airports_csv() {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read airport table at {:?}", path))?,
        ),
        None => None,
    };

    let reference_data = build_reference_data(airports_csv.as_deref(), config.aircraft_types())
        .context("Failed to load reference data")?;
    tracing::debug!(
        "Reference data: {} airports, {} aircraft types",
        reference_data.iata_to_icao.len(),
        reference_data.aircraft_types.len()
    );

    Ok(reference_data)
}
