//! SQLite persistence.
//!
//! A `Store` wraps one connection and is meant to live for a single pipeline
//! step. Every write is a single statement, so each one commits on its own and a
//! crash mid-step never leaves a half-written row.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::domain::{CompanyAnchor, FeedFiling, FilingPrices, NewFiling, Observation, PriceBar, RateRow, ReturnRecord, TimeSeries};
use crate::error::AppError;

mod schema;

pub use schema::SCHEMA;

/// Key of the filing-feed offset in `ingestion_cursor`.
pub const FILING_CURSOR_KEY: &str = "sec_filings_offset";

/// Persisted pagination offset.
///
/// Injected into the ingestion controller; the store implements it over the
/// `ingestion_cursor` table.
pub trait CursorStore {
    /// Current offset, `0` if it was never written. A stored value that is not
    /// an integer is an error.
    fn read(&self) -> Result<i64, AppError>;
    fn write(&self, value: i64) -> Result<(), AppError>;
}

#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.create_tables()?;
        Ok(store)
    }

    /// In-memory database, mostly for tests.
    pub fn in_memory() -> Result<Self, AppError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.create_tables()?;
        Ok(store)
    }

    pub fn create_tables(&self) -> Result<(), AppError> {
        self.conn.execute_batch(SCHEMA)?;
        debug!("schema initialized");
        Ok(())
    }

    // --- companies / filings ---

    /// Insert the filing's company unless its CIK is already known.
    pub fn insert_company_if_absent(&self, filing: &FeedFiling) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO companies (cik, name, ticker) VALUES (?1, ?2, ?3)",
            params![filing.external_company_id, filing.company_name, filing.ticker],
        )?;
        Ok(())
    }

    pub fn company_id(&self, cik: &str) -> Result<Option<i64>, AppError> {
        let id = self
            .conn
            .query_row("SELECT id FROM companies WHERE cik = ?1", params![cik], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// Insert a filing unless its source URL is already stored.
    ///
    /// Returns `true` if a row was inserted.
    pub fn insert_filing_if_absent(&self, filing: &NewFiling) -> Result<bool, AppError> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO filings (company_id, filing_date, filing_type, filing_url, is_convertible)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                filing.company_id,
                filing.filing_date.to_string(),
                filing.filing_type,
                filing.source_url,
                filing.is_convertible,
            ],
        )?;
        Ok(changed == 1)
    }

    pub fn filing_count(&self) -> Result<i64, AppError> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM filings", [], |row| row.get(0))?)
    }

    /// Raw `filing_date` strings of every stored filing.
    pub fn filing_date_strings(&self) -> Result<Vec<String>, AppError> {
        let mut stmt = self.conn.prepare("SELECT filing_date FROM filings ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

        let mut out = Vec::new();
        for row in rows {
            if let Some(date) = row? {
                out.push(date);
            }
        }
        Ok(out)
    }

    /// Every company with a ticker, paired with its earliest filing date.
    pub fn companies_with_earliest_filing(&self) -> Result<Vec<CompanyAnchor>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.ticker, MIN(f.filing_date)
             FROM companies c
             JOIN filings f ON c.id = f.company_id
             WHERE c.ticker IS NOT NULL AND c.ticker != ''
             GROUP BY c.id, c.ticker
             ORDER BY c.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Option<String>>(2)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (company_id, ticker, raw_date) = row?;
            let Some(filing_date) = raw_date.as_deref().and_then(parse_date) else {
                warn!(company_id, ticker = %ticker, date = ?raw_date, "skipping company with malformed filing date");
                continue;
            };
            out.push(CompanyAnchor {
                company_id,
                ticker,
                filing_date,
            });
        }
        Ok(out)
    }

    // --- prices ---

    /// Store daily bars; bars already present for `(company, date)` are kept.
    pub fn insert_prices_if_absent(&self, company_id: i64, bars: &[PriceBar]) -> Result<usize, AppError> {
        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO stock_prices (company_id, date, close, high, low, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let mut inserted = 0;
        for bar in bars {
            inserted += stmt.execute(params![
                company_id,
                bar.date.to_string(),
                bar.close,
                bar.high,
                bar.low,
                bar.volume,
            ])?;
        }
        Ok(inserted)
    }

    /// Stored closes around the earliest filing of each company.
    ///
    /// Only bars dated within `[filing_date + from_offset_days, filing_date + to_offset_days]`
    /// are returned, so prices fetched for an earlier anchor do not leak in.
    pub fn earliest_filing_prices(&self, from_offset_days: i64, to_offset_days: i64) -> Result<Vec<FilingPrices>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.filing_date, c.ticker, sp.date, sp.close
             FROM filings f
             JOIN companies c ON f.company_id = c.id
             JOIN stock_prices sp ON sp.company_id = c.id
             WHERE f.filing_date = (
                 SELECT MIN(f2.filing_date) FROM filings f2 WHERE f2.company_id = f.company_id
             )
               AND sp.date >= date(f.filing_date, ?1 || ' days')
               AND sp.date <= date(f.filing_date, ?2 || ' days')
             ORDER BY f.id, sp.date",
        )?;
        let rows = stmt.query_map(params![from_offset_days, to_offset_days], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<f64>>(4)?,
            ))
        })?;

        let mut out: Vec<FilingPrices> = Vec::new();
        for row in rows {
            let (filing_id, filing_date, ticker, price_date, close) = row?;
            let Some(filing_date) = filing_date.as_deref().and_then(parse_date) else {
                continue;
            };
            let (Some(date), Some(close)) = (price_date.as_deref().and_then(parse_date), close) else {
                continue;
            };

            let obs = Observation::new(date, close);
            if let Some(group) = out.last_mut().filter(|g| g.filing_id == filing_id) {
                group.closes.push(obs);
                continue;
            }
            out.push(FilingPrices {
                filing_id,
                ticker: ticker.unwrap_or_default(),
                filing_date,
                closes: vec![obs],
            });
        }
        Ok(out)
    }

    // --- returns ---

    /// Insert or overwrite the returns for `(company, filing_date)`.
    pub fn upsert_return(&self, record: &ReturnRecord) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO stock_returns (company_id, filing_date, window_a_pct, window_b_pct)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(company_id, filing_date) DO UPDATE SET
                 window_a_pct = excluded.window_a_pct,
                 window_b_pct = excluded.window_b_pct",
            params![
                record.company_id,
                record.filing_date.to_string(),
                record.window_a_pct,
                record.window_b_pct,
            ],
        )?;
        Ok(())
    }

    /// Stored returns, one per company: rows for anything but the company's
    /// current earliest filing are left out.
    pub fn stock_returns(&self) -> Result<Vec<ReturnRecord>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT r.company_id, r.filing_date, r.window_a_pct, r.window_b_pct
             FROM stock_returns r
             WHERE r.filing_date = (
                 SELECT MIN(f.filing_date) FROM filings f WHERE f.company_id = r.company_id
             )
             ORDER BY r.company_id, r.filing_date",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (company_id, raw_date, window_a_pct, window_b_pct) = row?;
            let Some(filing_date) = parse_date(&raw_date) else {
                continue;
            };
            out.push(ReturnRecord {
                company_id,
                filing_date,
                window_a_pct,
                window_b_pct,
            });
        }
        Ok(out)
    }

    // --- rates ---

    /// Insert rate rows, filling gaps in existing rows without erasing values.
    pub fn upsert_rates(&self, rows: &[RateRow]) -> Result<usize, AppError> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO interest_rates (date, treasury_10y, effr, baa_yield)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(date) DO UPDATE SET
                 treasury_10y = COALESCE(excluded.treasury_10y, treasury_10y),
                 effr = COALESCE(excluded.effr, effr),
                 baa_yield = COALESCE(excluded.baa_yield, baa_yield)",
        )?;
        let mut written = 0;
        for r in rows {
            written += stmt.execute(params![r.date.to_string(), r.treasury_10y, r.effr, r.baa_yield])?;
        }
        Ok(written)
    }

    /// The 10-year Treasury series, ascending, malformed rows skipped.
    pub fn treasury_10y_series(&self) -> Result<TimeSeries, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, treasury_10y FROM interest_rates
             WHERE treasury_10y IS NOT NULL
             ORDER BY date",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?;

        let mut points = Vec::new();
        for row in rows {
            let (raw_date, value) = row?;
            match parse_date(&raw_date) {
                Some(date) => points.push(Observation::new(date, value)),
                None => warn!(date = %raw_date, "skipping interest-rate row with malformed date"),
            }
        }
        Ok(TimeSeries::from_unsorted(points))
    }
}

impl CursorStore for Store {
    fn read(&self) -> Result<i64, AppError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM ingestion_cursor WHERE key = ?1",
                params![FILING_CURSOR_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(0);
        };
        // Malformed values fail the step; the cursor never rewinds.
        raw.trim()
            .parse::<i64>()
            .map_err(|err| AppError::from(rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err))))
    }

    fn write(&self, value: i64) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO ingestion_cursor (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![FILING_CURSOR_KEY, value.to_string()],
        )?;
        Ok(())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn feed_filing(cik: &str, ticker: Option<&str>, date: NaiveDate, url: &str) -> FeedFiling {
        FeedFiling {
            external_company_id: cik.to_string(),
            company_name: format!("Company {cik}"),
            ticker: ticker.map(str::to_string),
            filed_at: date,
            form_type: "8-K".to_string(),
            detail_url: url.to_string(),
            form_description: String::new(),
        }
    }

    fn store_filing(store: &Store, f: &FeedFiling) -> bool {
        store.insert_company_if_absent(f).unwrap();
        let company_id = store.company_id(&f.external_company_id).unwrap().unwrap();
        store
            .insert_filing_if_absent(&NewFiling {
                company_id,
                filing_date: f.filed_at,
                filing_type: f.form_type.clone(),
                source_url: f.detail_url.clone(),
                is_convertible: true,
            })
            .unwrap()
    }

    #[test]
    fn create_tables_is_idempotent() {
        let store = Store::in_memory().unwrap();
        store.create_tables().unwrap();
        assert_eq!(store.filing_count().unwrap(), 0);
    }

    #[test]
    fn duplicate_source_url_is_ignored() {
        let store = Store::in_memory().unwrap();
        let f = feed_filing("1", Some("AAA"), d(2024, 1, 5), "https://sec/a");
        assert!(store_filing(&store, &f));
        assert!(!store_filing(&store, &f));
        assert_eq!(store.filing_count().unwrap(), 1);
    }

    #[test]
    fn earliest_filing_per_company() {
        let store = Store::in_memory().unwrap();
        store_filing(&store, &feed_filing("1", Some("AAA"), d(2024, 2, 5), "u1"));
        store_filing(&store, &feed_filing("1", Some("AAA"), d(2024, 1, 5), "u2"));
        store_filing(&store, &feed_filing("2", None, d(2024, 1, 9), "u3"));

        let anchors = store.companies_with_earliest_filing().unwrap();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].ticker, "AAA");
        assert_eq!(anchors[0].filing_date, d(2024, 1, 5));
    }

    #[test]
    fn return_upsert_overwrites() {
        let store = Store::in_memory().unwrap();
        store_filing(&store, &feed_filing("1", Some("AAA"), d(2024, 1, 5), "u1"));
        let mut rec = ReturnRecord {
            company_id: store.company_id("1").unwrap().unwrap(),
            filing_date: d(2024, 1, 5),
            window_a_pct: Some(1.0),
            window_b_pct: None,
        };
        store.upsert_return(&rec).unwrap();
        rec.window_b_pct = Some(2.0);
        store.upsert_return(&rec).unwrap();

        let rows = store.stock_returns().unwrap();
        assert_eq!(rows, vec![rec]);
    }

    #[test]
    fn returns_for_superseded_anchor_are_not_read() {
        let store = Store::in_memory().unwrap();
        store_filing(&store, &feed_filing("1", Some("AAA"), d(2024, 3, 1), "u1"));
        let company_id = store.company_id("1").unwrap().unwrap();
        let rec = |filing_date| ReturnRecord {
            company_id,
            filing_date,
            window_a_pct: Some(1.0),
            window_b_pct: None,
        };
        store.upsert_return(&rec(d(2024, 3, 1))).unwrap();

        // An older filing arrives from a later page and becomes the anchor.
        store_filing(&store, &feed_filing("1", Some("AAA"), d(2024, 1, 2), "u2"));
        assert!(store.stock_returns().unwrap().is_empty());

        store.upsert_return(&rec(d(2024, 1, 2))).unwrap();
        assert_eq!(store.stock_returns().unwrap(), vec![rec(d(2024, 1, 2))]);
    }

    #[test]
    fn rate_upsert_fills_without_erasing() {
        let store = Store::in_memory().unwrap();
        store
            .upsert_rates(&[RateRow {
                date: d(2024, 1, 2),
                treasury_10y: Some(3.9),
                effr: None,
                baa_yield: None,
            }])
            .unwrap();
        store
            .upsert_rates(&[RateRow {
                date: d(2024, 1, 2),
                treasury_10y: None,
                effr: Some(5.33),
                baa_yield: None,
            }])
            .unwrap();

        let series = store.treasury_10y_series().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.as_of(d(2024, 1, 2)), Some(3.9));
    }

    #[test]
    fn cursor_defaults_to_zero_and_persists() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.read().unwrap(), 0);
        store.write(25).unwrap();
        store.write(50).unwrap();
        assert_eq!(store.read().unwrap(), 50);
    }

    #[test]
    fn malformed_cursor_is_an_error_not_a_rewind() {
        let store = Store::in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO ingestion_cursor (key, value) VALUES (?1, 'fifty')",
                params![FILING_CURSOR_KEY],
            )
            .unwrap();

        let err = store.read().unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn prices_grouped_for_earliest_filing_only() {
        let store = Store::in_memory().unwrap();
        store_filing(&store, &feed_filing("1", Some("AAA"), d(2024, 1, 1), "u1"));
        store_filing(&store, &feed_filing("1", Some("AAA"), d(2024, 3, 1), "u2"));
        let company_id = store.company_id("1").unwrap().unwrap();

        let bar = |date, close| PriceBar {
            date,
            close,
            high: None,
            low: None,
            volume: None,
        };
        let inserted = store
            .insert_prices_if_absent(
                company_id,
                &[bar(d(2024, 1, 2), 10.0), bar(d(2024, 1, 9), 12.0), bar(d(2024, 3, 4), 30.0)],
            )
            .unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(store.insert_prices_if_absent(company_id, &[bar(d(2024, 1, 2), 99.0)]).unwrap(), 0);

        // The March bar lies outside the anchor's window.
        let groups = store.earliest_filing_prices(0, 17).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].filing_date, d(2024, 1, 1));
        assert_eq!(groups[0].closes.len(), 2);
        assert_eq!(groups[0].closes[0].value, 10.0);
    }
}
