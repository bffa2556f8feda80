//! FRED API integration for interest-rate series.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::data::RateFeed;
use crate::domain::RateObservation;
use crate::error::AppError;

const SOURCE: &str = "FRED";

/// 10-year Treasury constant-maturity yield (bucketing series).
pub const SERIES_TREASURY_10Y: &str = "DGS10";
/// Effective federal funds rate.
pub const SERIES_EFFR: &str = "FEDFUNDS";
/// Moody's Baa corporate bond yield.
pub const SERIES_BAA: &str = "BAA";

pub struct FredClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FredClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl RateFeed for FredClient {
    fn observations(&self, series_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<RateObservation>, AppError> {
        let url = format!("{}/series/observations", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("observation_start", &from.to_string()),
                ("observation_end", &to.to_string()),
            ])
            .send()
            .map_err(|e| AppError::fetch(SOURCE, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(SOURCE, format!("status {} for series {series_id}", resp.status())));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::fetch(SOURCE, format!("failed to parse response: {e}")))?;

        let out = parse_observations(series_id, body.observations);
        debug!(series_id, n = out.len(), "fetched FRED observations");
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(series_id: &str, raw: Vec<Observation>) -> Vec<RateObservation> {
    let mut out = Vec::with_capacity(raw.len());
    for obs in raw {
        let Ok(date) = NaiveDate::parse_from_str(obs.date.trim(), "%Y-%m-%d") else {
            warn!(series_id, date = %obs.date, "skipping FRED observation with malformed date");
            continue;
        };
        out.push(RateObservation {
            date,
            value: parse_value(&obs.value),
        });
    }
    out
}

/// FRED marks missing fixings with ".".
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}
