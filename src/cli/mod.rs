//! Command-line parsing for the filing / rate analysis pipeline.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! ingestion and analysis code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::FilingVariant;
use crate::ingest::CursorAdvance;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cvr",
    version,
    about = "Convertible-offering filings vs. interest rates (SEC + StockData + FRED)"
)]
pub struct Cli {
    /// SQLite database path (overrides CVR_DB_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database tables.
    Init,
    /// Fetch the next page of filings and store new ones.
    Filings(FilingArgs),
    /// Fetch prices around each company's earliest filing and upsert window returns.
    Returns(ReturnArgs),
    /// Fetch interest-rate history.
    Rates(RateArgs),
    /// Analyse stored data and write the summary report.
    Analyze(AnalyzeCommand),
    /// Run filings, returns, rates and analyze in sequence.
    Run(RunArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FilingArgs {
    /// Page size requested from the filing feed.
    #[arg(long, default_value_t = 25)]
    pub limit: i64,

    /// Which offering filings to search for.
    #[arg(long, value_enum, default_value_t = FilingVariant::ConvertibleDebt)]
    pub variant: FilingVariant,

    /// Advance the cursor by rows received instead of by `--limit`.
    #[arg(long)]
    pub advance_by_received: bool,
}

impl FilingArgs {
    pub fn cursor_advance(&self) -> CursorAdvance {
        if self.advance_by_received {
            CursorAdvance::Received
        } else {
            CursorAdvance::FixedLimit
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct ReturnArgs {
    /// Calendar days from filing to the end of window A.
    #[arg(long, default_value_t = 5)]
    pub window_a: i64,

    /// Calendar days from filing to the end of window B.
    #[arg(long, default_value_t = 10)]
    pub window_b: i64,

    /// Extra days of prices requested past window B.
    #[arg(long, default_value_t = 7)]
    pub buffer_days: i64,
}

#[derive(Debug, Args, Clone)]
pub struct RateArgs {
    /// Years of history to request, ending today.
    #[arg(long, default_value_t = 5)]
    pub years_back: u32,

    /// Maximum number of dates to store.
    #[arg(long, default_value_t = 99_999)]
    pub max_rows: usize,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Text summary output.
    #[arg(long, default_value = "analysis_summary.txt")]
    pub summary: PathBuf,

    /// Also export the structured report as JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// Print the summary to stdout as well.
    #[arg(long)]
    pub print: bool,
}

/// `cvr analyze`: report options plus the window offsets the stored returns
/// were computed with.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeCommand {
    #[command(flatten)]
    pub analyze: AnalyzeArgs,

    #[command(flatten)]
    pub returns: ReturnArgs,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub filings: FilingArgs,

    #[command(flatten)]
    pub returns: ReturnArgs,

    #[command(flatten)]
    pub rates: RateArgs,

    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}
