//! Table definitions.
//!
//! Dates are stored as ISO `YYYY-MM-DD` text so that lexical order matches
//! calendar order (the earliest-filing queries rely on `MIN(filing_date)`).

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY,
    cik TEXT UNIQUE,
    name TEXT,
    ticker TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS filings (
    id INTEGER PRIMARY KEY,
    company_id INTEGER,
    filing_date TEXT,
    filing_type TEXT,
    filing_url TEXT UNIQUE,
    is_convertible INTEGER,
    FOREIGN KEY (company_id) REFERENCES companies(id)
);

CREATE INDEX IF NOT EXISTS idx_filings_company_date ON filings(company_id, filing_date);

CREATE TABLE IF NOT EXISTS stock_prices (
    id INTEGER PRIMARY KEY,
    company_id INTEGER,
    date TEXT,
    close REAL,
    high REAL,
    low REAL,
    volume INTEGER,
    FOREIGN KEY (company_id) REFERENCES companies(id),
    UNIQUE(company_id, date)
);

CREATE TABLE IF NOT EXISTS interest_rates (
    id INTEGER PRIMARY KEY,
    date TEXT UNIQUE,
    treasury_10y REAL,
    effr REAL,
    baa_yield REAL
);

CREATE TABLE IF NOT EXISTS stock_returns (
    id INTEGER PRIMARY KEY,
    company_id INTEGER,
    filing_date TEXT,
    window_a_pct REAL,
    window_b_pct REAL,
    FOREIGN KEY (company_id) REFERENCES companies(id),
    UNIQUE(company_id, filing_date)
);

CREATE TABLE IF NOT EXISTS ingestion_cursor (
    key TEXT PRIMARY KEY,
    value TEXT
);
";
