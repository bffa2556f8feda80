//! sec-api.io full-text filing search.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::{FilingFeed, parse_leading_date};
use crate::domain::FeedFiling;
use crate::error::AppError;

const SOURCE: &str = "SEC";

pub struct SecApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SecApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl FilingFeed for SecApiClient {
    fn search(&self, query: &str, offset: i64, limit: i64) -> Result<Vec<FeedFiling>, AppError> {
        let payload = SearchRequest {
            query,
            from: offset.to_string(),
            size: limit.to_string(),
            sort: vec![SortKey {
                filed_at: SortOrder { order: "desc" },
            }],
        };

        let resp = self
            .client
            .post(&self.base_url)
            .query(&[("token", &self.api_key)])
            .json(&payload)
            .send()
            .map_err(|e| AppError::fetch(SOURCE, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(SOURCE, format!("status {}", resp.status())));
        }

        let body: SearchResponse = resp
            .json()
            .map_err(|e| AppError::fetch(SOURCE, format!("failed to parse response: {e}")))?;

        let filings: Vec<FeedFiling> = body.filings.into_iter().filter_map(validate).collect();
        debug!(offset, limit, n = filings.len(), "fetched SEC filings");
        Ok(filings)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    from: String,
    size: String,
    sort: Vec<SortKey>,
}

#[derive(Debug, Serialize)]
struct SortKey {
    #[serde(rename = "filedAt")]
    filed_at: SortOrder,
}

#[derive(Debug, Serialize)]
struct SortOrder {
    order: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    filings: Vec<RawFiling>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFiling {
    cik: Option<String>,
    company_name: Option<String>,
    ticker: Option<String>,
    filed_at: Option<String>,
    form_type: Option<String>,
    link_to_html: Option<String>,
    #[serde(alias = "description")]
    form_description: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Turn a raw hit into a `FeedFiling`, or drop it if a required field is bad.
fn validate(raw: RawFiling) -> Option<FeedFiling> {
    let Some(cik) = non_blank(raw.cik) else {
        warn!(url = ?raw.link_to_html, "skipping SEC filing without CIK");
        return None;
    };
    let Some(detail_url) = non_blank(raw.link_to_html) else {
        warn!(cik = %cik, "skipping SEC filing without document URL");
        return None;
    };
    let Some(filed_at) = raw.filed_at.as_deref().and_then(parse_leading_date) else {
        warn!(cik = %cik, filed_at = ?raw.filed_at, "skipping SEC filing with malformed filedAt");
        return None;
    };

    Some(FeedFiling {
        company_name: non_blank(raw.company_name).unwrap_or_else(|| cik.clone()),
        external_company_id: cik,
        ticker: non_blank(raw.ticker).map(|t| t.to_uppercase()),
        filed_at,
        form_type: non_blank(raw.form_type).unwrap_or_default(),
        detail_url,
        form_description: raw.form_description.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn request_payload_matches_search_api() {
        let payload = SearchRequest {
            query: "formType:\"8-K\"",
            from: 25.to_string(),
            size: 25.to_string(),
            sort: vec![SortKey {
                filed_at: SortOrder { order: "desc" },
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["from"], "25");
        assert_eq!(json["size"], "25");
        assert_eq!(json["sort"][0]["filedAt"]["order"], "desc");
    }

    #[test]
    fn validate_keeps_good_rows_and_drops_bad_ones() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"total": {"value": 3}, "filings": [
                {"cik": "1234", "companyName": "Acme Corp", "ticker": "acme",
                 "filedAt": "2024-05-17T16:05:12-04:00", "formType": "8-K",
                 "linkToHtml": "https://www.sec.gov/a.htm", "description": "Convertible notes"},
                {"cik": "", "companyName": "No Cik", "filedAt": "2024-05-17",
                 "linkToHtml": "https://www.sec.gov/b.htm"},
                {"cik": "99", "filedAt": "yesterday", "linkToHtml": "https://www.sec.gov/c.htm"}
            ]}"#,
        )
        .unwrap();

        let filings: Vec<FeedFiling> = body.filings.into_iter().filter_map(validate).collect();
        assert_eq!(filings.len(), 1);
        let f = &filings[0];
        assert_eq!(f.external_company_id, "1234");
        assert_eq!(f.ticker.as_deref(), Some("ACME"));
        assert_eq!(f.filed_at, NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        assert_eq!(f.form_description, "Convertible notes");
    }
}
