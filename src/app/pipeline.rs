//! The individual pipeline steps shared by the step subcommands and `cvr run`.
//!
//! Each step opens its own `Store`, does its work and drops the connection, so no
//! connection is held across another step's network calls:
//!
//! filings -> returns (prices) -> rates -> analyze

use std::path::Path;

use chrono::{Months, NaiveDate};
use tracing::info;

use crate::analysis::ReturnWindows;
use crate::cli::{AnalyzeArgs, FilingArgs, RateArgs, ReturnArgs};
use crate::config::{Config, Credential};
use crate::data::{FredClient, SecApiClient, StockDataClient};
use crate::error::AppError;
use crate::ingest::{
    FilingIngestOptions, FilingIngestSummary, RateIngestOptions, RateIngestSummary, ReturnIngestOptions,
    ReturnIngestSummary, ingest_filings, ingest_rates, ingest_returns,
};
use crate::report::{AnalysisInput, AnalysisReport, build_report, format_summary};
use crate::store::Store;

pub fn init(db_path: &Path) -> Result<(), AppError> {
    Store::open(db_path)?;
    info!(db = %db_path.display(), "database initialized");
    Ok(())
}

/// Step A: one page of filings.
pub fn load_filings(config: &Config, args: &FilingArgs) -> Result<FilingIngestSummary, AppError> {
    if args.limit <= 0 {
        return Err(AppError::config(format!("--limit must be positive (got {}).", args.limit)));
    }
    let feed = SecApiClient::new(&config.sec_base_url, config.require(Credential::Sec)?);
    let store = Store::open(&config.db_path)?;

    let options = FilingIngestOptions {
        limit: args.limit,
        variant: args.variant,
        advance: args.cursor_advance(),
    };
    ingest_filings(&feed, &store, &store, &options)
}

/// Step B: prices and window returns.
pub fn load_returns(config: &Config, args: &ReturnArgs) -> Result<ReturnIngestSummary, AppError> {
    let options = return_options(args)?;
    let feed = StockDataClient::new(&config.stockdata_base_url, config.require(Credential::StockData)?);
    let store = Store::open(&config.db_path)?;
    ingest_returns(&feed, &store, &options)
}

/// Step C: rate history ending `today`.
pub fn load_rates(config: &Config, args: &RateArgs, today: NaiveDate) -> Result<RateIngestSummary, AppError> {
    let start = args
        .years_back
        .checked_mul(12)
        .and_then(|months| today.checked_sub_months(Months::new(months)))
        .ok_or_else(|| AppError::config(format!("--years-back {} is out of range.", args.years_back)))?;

    let feed = FredClient::new(&config.fred_base_url, config.require(Credential::Fred)?);
    let store = Store::open(&config.db_path)?;

    let options = RateIngestOptions {
        start,
        end: today,
        max_rows: args.max_rows,
    };
    ingest_rates(&feed, &store, &options)
}

/// Step D: aggregate stored data and write the report files.
///
/// `returns` must carry the window offsets the returns were computed with; they
/// label the report and bound the prices read back for each anchor.
pub fn analyze(config: &Config, args: &AnalyzeArgs, returns: &ReturnIngestOptions) -> Result<AnalysisReport, AppError> {
    let store = Store::open(&config.db_path)?;
    let input = load_analysis_input(&store, returns)?;
    drop(store);

    let report = build_report(&input);
    info!(
        filings = report.filings_total,
        bucketed = report.buckets.total(),
        window_a_samples = report.returns.window_a_samples(),
        window_b_samples = report.returns.window_b_samples(),
        "analysis complete"
    );

    let text = format_summary(&report, &returns.windows);
    crate::io::export::write_summary_text(&args.summary, &text)?;
    info!(path = %args.summary.display(), "summary written");

    if let Some(path) = &args.json {
        crate::io::export::write_report_json(path, &report)?;
        info!(path = %path.display(), "report JSON written");
    }
    if args.print {
        println!("{text}");
    }

    Ok(report)
}

pub fn load_analysis_input(store: &Store, returns: &ReturnIngestOptions) -> Result<AnalysisInput, AppError> {
    let (from_offset, to_offset) = returns.price_offsets();
    Ok(AnalysisInput {
        filing_dates: store.filing_date_strings()?,
        rates: store.treasury_10y_series()?,
        returns: store.stock_returns()?,
        earliest_filing_prices: store.earliest_filing_prices(from_offset, to_offset)?,
    })
}

/// Validate the window offsets given on the command line.
pub fn return_options(args: &ReturnArgs) -> Result<ReturnIngestOptions, AppError> {
    if args.window_a <= 0 || args.window_b <= args.window_a {
        return Err(AppError::config(format!(
            "window offsets must satisfy 0 < window-a < window-b (got {} and {}).",
            args.window_a, args.window_b
        )));
    }
    if args.buffer_days < 0 {
        return Err(AppError::config("--buffer-days must not be negative."));
    }

    Ok(ReturnIngestOptions {
        windows: ReturnWindows {
            anchor_days: 0,
            window_a_days: args.window_a,
            window_b_days: args.window_b,
        },
        buffer_days: args.buffer_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_offsets_are_validated() {
        let ok = return_options(&ReturnArgs {
            window_a: 5,
            window_b: 10,
            buffer_days: 7,
        })
        .unwrap();
        assert_eq!(ok.windows, ReturnWindows::default());

        let err = return_options(&ReturnArgs {
            window_a: 10,
            window_b: 5,
            buffer_days: 7,
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn fetch_steps_fail_fast_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::from_lookup(|_| None);
        config.db_path = dir.path().join("cvr.db");

        let err = load_filings(
            &config,
            &FilingArgs {
                limit: 25,
                variant: crate::domain::FilingVariant::ConvertibleDebt,
                advance_by_received: false,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        // No store was opened, so nothing was created on disk.
        assert!(!config.db_path.exists());
    }

    #[test]
    fn analyze_labels_windows_with_given_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::from_lookup(|_| None);
        config.db_path = dir.path().join("cvr.db");
        let summary = dir.path().join("summary.txt");

        let returns = return_options(&ReturnArgs {
            window_a: 3,
            window_b: 7,
            buffer_days: 7,
        })
        .unwrap();
        analyze(
            &config,
            &AnalyzeArgs {
                summary: summary.clone(),
                json: None,
                print: false,
            },
            &returns,
        )
        .unwrap();

        let text = std::fs::read_to_string(&summary).unwrap();
        assert!(text.contains("Day 0 -> Day 3"));
        assert!(text.contains("Day 3 -> Day 7"));
    }

    #[test]
    fn years_back_overflow_is_a_config_error() {
        let config = Config::from_lookup(|_| None);
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        let err = load_rates(
            &config,
            &RateArgs {
                years_back: u32::MAX,
                max_rows: 10,
            },
            today,
        )
        .unwrap_err();
        assert!(matches!(&err, AppError::Config(msg) if msg.contains("out of range")));
    }
}
