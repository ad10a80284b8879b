//! `ironsieve` - run one user batch through validation and quarantine routing.

use clap::Parser;
use ironsieve::logging::{DEFAULT_DIRECTIVE, init_logging};
use ironsieve::{ColumnMode, Pipeline, PipelineConfig, RunOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Validate a batch of user records and split it into trusted and quarantined rows.
#[derive(Debug, Parser)]
#[command(name = "ironsieve")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Delimited input file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for trusted Parquet files
    #[arg(long)]
    trusted_dir: Option<PathBuf>,

    /// Directory for quarantine Parquet files
    #[arg(long)]
    quarantine_dir: Option<PathBuf>,

    /// Directory for the alert log and failure reports
    #[arg(long)]
    alert_dir: Option<PathBuf>,

    /// Reject input columns the schema does not declare
    #[arg(long)]
    strict: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(dir) = self.trusted_dir {
            config.trusted_dir = dir;
        }
        if let Some(dir) = self.quarantine_dir {
            config.quarantine_dir = dir;
        }
        if let Some(dir) = self.alert_dir {
            config.alert_dir = dir;
        }
        if self.strict {
            config.column_mode = ColumnMode::Strict;
        }
        Ok(config)
    }
}

fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let config = cli.into_config()?;
    let mut pipeline = Pipeline::from_config(&config);
    pipeline.run(&config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(DEFAULT_DIRECTIVE) {
        eprintln!("warning: logging disabled: {e}");
    }

    match run(cli) {
        Ok(RunOutcome::Clean(summary)) => {
            info!(rows = summary.valid_rows, "pipeline finished successfully");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Quarantined(summary)) => {
            info!(
                trusted = summary.valid_rows,
                quarantined = summary.invalid_rows,
                "pipeline finished with quarantined rows"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
