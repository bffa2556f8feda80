//! Incremental ingestion.
//!
//! Each function runs one step against a feed and a store:
//!
//! - `filings`: one page of the filing feed per run, paginated by a persisted cursor
//! - `returns`: prices around each company's earliest filing, window returns upserted
//! - `rates`: macro rate series joined by date and upserted
//!
//! Rows that fail validation or cannot be linked to a parent are skipped with a
//! warning; feed and storage errors abort the step.

pub mod filings;
pub mod rates;
pub mod returns;

pub use filings::{CursorAdvance, FilingIngestOptions, FilingIngestSummary, ingest_filings};
pub use rates::{RateIngestOptions, RateIngestSummary, ingest_rates, merge_rate_series};
pub use returns::{ReturnIngestOptions, ReturnIngestSummary, ingest_returns};
