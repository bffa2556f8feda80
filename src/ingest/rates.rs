//! Interest-rate ingestion.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::data::RateFeed;
use crate::data::fred::{SERIES_BAA, SERIES_EFFR, SERIES_TREASURY_10Y};
use crate::domain::{RateObservation, RateRow};
use crate::error::AppError;
use crate::store::Store;

#[derive(Debug, Clone, Copy)]
pub struct RateIngestOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Keep at most this many dates (earliest first).
    pub max_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateIngestSummary {
    pub rows: usize,
    pub written: usize,
}

/// Fetch the 10-year Treasury, fed funds and Baa series and upsert them by date.
pub fn ingest_rates<R>(feed: &R, store: &Store, options: &RateIngestOptions) -> Result<RateIngestSummary, AppError>
where
    R: RateFeed + ?Sized,
{
    info!(start = %options.start, end = %options.end, "fetching interest rates");

    let treasury = feed.observations(SERIES_TREASURY_10Y, options.start, options.end)?;
    let effr = feed.observations(SERIES_EFFR, options.start, options.end)?;
    let baa = feed.observations(SERIES_BAA, options.start, options.end)?;

    let mut rows = merge_rate_series(&treasury, &effr, &baa);
    rows.truncate(options.max_rows);

    let written = store.upsert_rates(&rows)?;
    info!(rows = rows.len(), "stored interest rates");

    Ok(RateIngestSummary {
        rows: rows.len(),
        written,
    })
}

/// Outer-join the three series by date, ascending.
///
/// FEDFUNDS and BAA are monthly, so most rows carry only the daily 10-year
/// value.
pub fn merge_rate_series(
    treasury: &[RateObservation],
    effr: &[RateObservation],
    baa: &[RateObservation],
) -> Vec<RateRow> {
    let mut by_date: BTreeMap<NaiveDate, RateRow> = BTreeMap::new();

    for obs in treasury {
        row_for(&mut by_date, obs.date).treasury_10y = obs.value;
    }
    for obs in effr {
        row_for(&mut by_date, obs.date).effr = obs.value;
    }
    for obs in baa {
        row_for(&mut by_date, obs.date).baa_yield = obs.value;
    }

    by_date.into_values().collect()
}

fn row_for(rows: &mut BTreeMap<NaiveDate, RateRow>, date: NaiveDate) -> &mut RateRow {
    rows.entry(date).or_insert(RateRow {
        date,
        treasury_10y: None,
        effr: None,
        baa_yield: None,
    })
}
