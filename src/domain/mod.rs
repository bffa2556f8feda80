//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - dated series (`Observation`, `TimeSeries`)
//! - validated feed records (`FeedFiling`, `PriceBar`, `RateObservation`)
//! - stored entities (`NewFiling`, `RateRow`, `ReturnRecord`)

pub mod types;

pub use types::*;
