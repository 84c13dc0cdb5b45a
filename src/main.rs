use std::fs;
use std::path::PathBuf;

use bank_wrapped::core::Ledger;
use bank_wrapped::{import, report};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Deserialize, Default)]
struct ReportConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
struct Config {
    #[serde(default)]
    report: ReportConfig,
}

#[derive(Parser)]
#[command(
    name = "wrapped",
    about = "Assemble the monthly financial report from a bank ledger"
)]
struct Cli {
    /// Reporting month in YYYY-MM form
    #[arg(long)]
    month: String,
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// Ledger CSV to read; overrides the config file
    #[arg(long)]
    input: Option<PathBuf>,
    /// Report JSON to write; overrides the config file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug)]
enum CliError {
    InvalidConfig(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// A missing config file falls back to the defaults; a present but broken
/// one is an error.
fn load_config(path: &PathBuf) -> Result<Config, CliError> {
    match fs::read_to_string(path) {
        Ok(data) => toml::from_str(&data).map_err(|e| CliError::InvalidConfig(e.to_string())),
        Err(_) => Ok(Config::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    let input = cli
        .input
        .or(cfg.report.input)
        .unwrap_or_else(|| PathBuf::from("data/bank_account.csv"));
    let output = cli
        .output
        .or(cfg.report.output)
        .unwrap_or_else(|| PathBuf::from("public/data.json"));

    let rows = import::csv::parse(&input)?;
    let ledger = Ledger::from_rows(rows)?;
    info!(transactions = ledger.len(), "ledger loaded");

    let cards = report::assemble(&ledger, &cli.month)?;
    let json = serde_json::to_string_pretty(&cards)?;
    fs::write(&output, json)?;
    info!(path = %output.display(), "report written");

    Ok(())
}
