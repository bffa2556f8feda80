//! Shared domain types.
//!
//! Feed clients produce these records after validation, the store persists them
//! and the analysis code consumes them. Nothing downstream re-checks raw strings.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One point of a dated series (a rate fixing or a daily close).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A series of observations in ascending date order.
///
/// The only way to build one from arbitrary input is [`TimeSeries::from_unsorted`],
/// which performs a stable sort. Observations sharing a date keep their input order,
/// so for as-of lookups the later one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<Observation>,
}

impl TimeSeries {
    pub fn from_unsorted(mut points: Vec<Observation>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.points.last()
    }

    /// Latest value on or before `target`.
    pub fn as_of(&self, target: NaiveDate) -> Option<f64> {
        crate::analysis::asof::latest_on_or_before(target, &self.points)
    }
}

impl FromIterator<Observation> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

/// Which family of offering filings to ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilingVariant {
    /// 8-K filings mentioning convertible debt, notes or bonds.
    ConvertibleDebt,
    /// 8-K filings announcing an equity offering.
    EquityOffering,
}

impl FilingVariant {
    /// Full-text search query sent to the filing feed.
    pub fn query(self) -> &'static str {
        match self {
            FilingVariant::ConvertibleDebt => {
                r#"formType:"8-K" AND ("convertible debt" OR "convertible notes" OR "convertible bond")"#
            }
            FilingVariant::EquityOffering => {
                r#"formType:"8-K" AND ("equity offering" OR "public offering of common stock" OR "registered direct offering")"#
            }
        }
    }

    /// Value of the `is_convertible` flag stored with each filing.
    pub fn is_convertible(self) -> bool {
        matches!(self, FilingVariant::ConvertibleDebt)
    }

    /// Whether a filing with this description belongs to the variant.
    ///
    /// Convertible preferred stock is an equity instrument and is dropped from
    /// the convertible-debt variant.
    pub fn accepts(self, description: &str) -> bool {
        match self {
            FilingVariant::ConvertibleDebt => {
                !description.to_lowercase().contains("convertible preferred")
            }
            FilingVariant::EquityOffering => true,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FilingVariant::ConvertibleDebt => "convertible debt",
            FilingVariant::EquityOffering => "equity offering",
        }
    }
}

/// A filing as returned by the filing feed, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedFiling {
    /// Stable issuer identifier (SEC CIK).
    pub external_company_id: String,
    pub company_name: String,
    pub ticker: Option<String>,
    pub filed_at: NaiveDate,
    pub form_type: String,
    pub detail_url: String,
    pub form_description: String,
}

/// A filing row to insert, after the company reference is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFiling {
    pub company_id: i64,
    pub filing_date: NaiveDate,
    pub filing_type: String,
    pub source_url: String,
    pub is_convertible: bool,
}

/// One trading day from the price feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<i64>,
}

impl PriceBar {
    pub fn close_observation(&self) -> Observation {
        Observation::new(self.date, self.close)
    }
}

/// One observation from the rate feed; FRED reports gaps as missing values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateObservation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// One row of `interest_rates`, joined across the fetched series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRow {
    pub date: NaiveDate,
    pub treasury_10y: Option<f64>,
    pub effr: Option<f64>,
    pub baa_yield: Option<f64>,
}

/// Post-filing window returns for one company and filing date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRecord {
    pub company_id: i64,
    pub filing_date: NaiveDate,
    pub window_a_pct: Option<f64>,
    pub window_b_pct: Option<f64>,
}

/// A company paired with its earliest stored filing.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyAnchor {
    pub company_id: i64,
    pub ticker: String,
    pub filing_date: NaiveDate,
}

/// Stored closes for the earliest filing of one company.
#[derive(Debug, Clone, PartialEq)]
pub struct FilingPrices {
    pub filing_id: i64,
    pub ticker: String,
    pub filing_date: NaiveDate,
    pub closes: Vec<Observation>,
}
