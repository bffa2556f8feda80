//! StockData.org end-of-day prices.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::data::{PriceFeed, parse_leading_date};
use crate::domain::PriceBar;
use crate::error::AppError;

const SOURCE: &str = "StockData";

pub struct StockDataClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StockDataClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl PriceFeed for StockDataClient {
    fn daily_prices(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<PriceBar>, AppError> {
        let url = format!("{}/data/eod", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("api_token", self.api_key.as_str()),
                ("symbols", ticker),
                ("date_from", &from.to_string()),
                ("date_to", &to.to_string()),
            ])
            .send()
            .map_err(|e| AppError::fetch(SOURCE, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(SOURCE, format!("status {} for {ticker}", resp.status())));
        }

        let body: EodResponse = resp
            .json()
            .map_err(|e| AppError::fetch(SOURCE, format!("failed to parse response: {e}")))?;

        let bars = parse_bars(ticker, body.data);
        debug!(ticker, n = bars.len(), "fetched daily prices");
        Ok(bars)
    }
}

#[derive(Debug, Deserialize)]
struct EodResponse {
    #[serde(default)]
    data: Vec<EodRecord>,
}

#[derive(Debug, Deserialize)]
struct EodRecord {
    date: Option<String>,
    close: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    volume: Option<f64>,
}

fn parse_bars(ticker: &str, records: Vec<EodRecord>) -> Vec<PriceBar> {
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        let Some(date) = rec.date.as_deref().and_then(parse_leading_date) else {
            warn!(ticker, date = ?rec.date, "skipping price bar with malformed date");
            continue;
        };
        let Some(close) = rec.close.filter(|c| c.is_finite()) else {
            warn!(ticker, %date, "skipping price bar without close");
            continue;
        };
        out.push(PriceBar {
            date,
            close,
            high: rec.high,
            low: rec.low,
            volume: rec.volume.map(|v| v as i64),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_without_date_or_close_are_dropped() {
        let body: EodResponse = serde_json::from_str(
            r#"{"meta": {}, "data": [
                {"date": "2024-03-04T00:00:00.000Z", "open": 10.0, "high": 11.0, "low": 9.5, "close": 10.5, "volume": 120000},
                {"date": "bad", "close": 10.0},
                {"date": "2024-03-05T00:00:00.000Z", "close": null}
            ]}"#,
        )
        .unwrap();

        let bars = parse_bars("ACME", body.data);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[0].volume, Some(120000));
    }
}
