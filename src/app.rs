//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration
//! - runs the requested ingestion / analysis steps

use chrono::Local;
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, RunArgs};
use crate::config::{Config, Credential};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cvr` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Command::Init => pipeline::init(&config.db_path),
        Command::Filings(args) => pipeline::load_filings(&config, &args).map(|_| ()),
        Command::Returns(args) => pipeline::load_returns(&config, &args).map(|_| ()),
        Command::Rates(args) => pipeline::load_rates(&config, &args, Local::now().date_naive()).map(|_| ()),
        Command::Analyze(args) => {
            let return_options = pipeline::return_options(&args.returns)?;
            pipeline::analyze(&config, &args.analyze, &return_options).map(|_| ())
        }
        Command::Run(args) => handle_run(&config, &args),
    }
}

/// All steps in order. Credentials for every fetch step are checked before the
/// first network call; the first failing step stops the run.
fn handle_run(config: &Config, args: &RunArgs) -> Result<(), AppError> {
    config.require_all(&[Credential::Sec, Credential::StockData, Credential::Fred])?;
    let return_options = pipeline::return_options(&args.returns)?;

    pipeline::init(&config.db_path)?;

    info!("step A: filings");
    pipeline::load_filings(config, &args.filings)?;

    info!("step B: prices and window returns");
    pipeline::load_returns(config, &args.returns)?;

    info!("step C: interest rates");
    pipeline::load_rates(config, &args.rates, Local::now().date_naive())?;

    info!("step D: analysis");
    pipeline::analyze(config, &args.analyze, &return_options)?;

    info!("run finished");
    Ok(())
}
