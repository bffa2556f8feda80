//! Price fetch and window-return upserts around each company's earliest filing.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::analysis::{ReturnWindows, compute_returns};
use crate::data::PriceFeed;
use crate::domain::{ReturnRecord, TimeSeries};
use crate::error::AppError;
use crate::store::Store;

#[derive(Debug, Clone, Copy)]
pub struct ReturnIngestOptions {
    pub windows: ReturnWindows,
    /// Extra calendar days requested past the last window to absorb weekends
    /// and holidays.
    pub buffer_days: i64,
}

impl Default for ReturnIngestOptions {
    fn default() -> Self {
        Self {
            windows: ReturnWindows::default(),
            buffer_days: 7,
        }
    }
}

impl ReturnIngestOptions {
    /// Calendar-day offsets from the filing date bounding the price request.
    pub fn price_offsets(&self) -> (i64, i64) {
        (
            self.windows.anchor_days.min(0),
            self.windows.max_offset_days() + self.buffer_days.max(0),
        )
    }

    /// Date range to request from the price feed for a filing.
    pub fn price_range(&self, filing_date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let (start_offset, end_offset) = self.price_offsets();
        let from = filing_date
            .checked_add_signed(Duration::days(start_offset))
            .unwrap_or(filing_date);
        let to = filing_date
            .checked_add_signed(Duration::days(end_offset))
            .unwrap_or(filing_date);
        (from, to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnIngestSummary {
    pub companies: usize,
    pub prices_stored: usize,
    pub without_prices: usize,
    pub without_window_a: usize,
    pub upserted: usize,
}

/// Compute and upsert window returns for every company with a ticker.
///
/// Only the earliest filing of each company is windowed. Re-running overwrites
/// the stored returns for the same `(company, filing_date)`, so later runs pick
/// up price history that was not available before.
pub fn ingest_returns<P>(feed: &P, store: &Store, options: &ReturnIngestOptions) -> Result<ReturnIngestSummary, AppError>
where
    P: PriceFeed + ?Sized,
{
    let anchors = store.companies_with_earliest_filing()?;
    info!(companies = anchors.len(), "computing window returns");

    let mut summary = ReturnIngestSummary {
        companies: anchors.len(),
        ..ReturnIngestSummary::default()
    };

    for anchor in &anchors {
        let (from, to) = options.price_range(anchor.filing_date);
        let bars = feed.daily_prices(&anchor.ticker, from, to)?;
        if bars.is_empty() {
            debug!(ticker = %anchor.ticker, %from, %to, "no prices returned");
            summary.without_prices += 1;
            continue;
        }

        summary.prices_stored += store.insert_prices_if_absent(anchor.company_id, &bars)?;

        let closes: TimeSeries = bars.iter().map(|b| b.close_observation()).collect();
        let returns = compute_returns(anchor.filing_date, &closes, &options.windows);
        let Some(window_a_pct) = returns.window_a_pct else {
            debug!(ticker = %anchor.ticker, filing_date = %anchor.filing_date, "window A unresolved");
            summary.without_window_a += 1;
            continue;
        };

        store.upsert_return(&ReturnRecord {
            company_id: anchor.company_id,
            filing_date: anchor.filing_date,
            window_a_pct: Some(window_a_pct),
            window_b_pct: returns.window_b_pct,
        })?;
        summary.upserted += 1;
    }

    info!(
        upserted = summary.upserted,
        without_prices = summary.without_prices,
        without_window_a = summary.without_window_a,
        "stored window returns"
    );
    Ok(summary)
}
