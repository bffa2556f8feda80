//! External feed clients.
//!
//! Each provider sits behind a small trait so the ingestion controller can be
//! driven by in-memory fakes in tests. Clients validate payloads here: rows with
//! malformed dates or numbers are dropped (with a warning) and never reach the
//! store.

use chrono::NaiveDate;

use crate::domain::{FeedFiling, PriceBar, RateObservation};
use crate::error::AppError;

pub mod fred;
pub mod sec;
pub mod stockdata;

pub use fred::FredClient;
pub use sec::SecApiClient;
pub use stockdata::StockDataClient;

/// Paginated full-text filing search.
pub trait FilingFeed {
    fn search(&self, query: &str, offset: i64, limit: i64) -> Result<Vec<FeedFiling>, AppError>;
}

/// End-of-day prices for one ticker.
pub trait PriceFeed {
    fn daily_prices(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<PriceBar>, AppError>;
}

/// Observations of one macro series.
pub trait RateFeed {
    fn observations(&self, series_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<RateObservation>, AppError>;
}

/// Parse the leading `YYYY-MM-DD` of a date or timestamp string.
pub(crate) fn parse_leading_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}
