//! Runtime configuration from the environment (and `.env`).
//!
//! API keys are optional at load time and checked per step with
//! [`Config::require`], so `cvr analyze` works without any credentials while a
//! fetch step fails before it touches the network.

use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_DB_PATH: &str = "asset_classes.db";
pub const DEFAULT_SEC_BASE_URL: &str = "https://api.sec-api.io";
pub const DEFAULT_STOCKDATA_BASE_URL: &str = "https://api.stockdata.org/v1";
pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Names of the credentials each feed needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Sec,
    StockData,
    Fred,
}

impl Credential {
    pub fn env_var(self) -> &'static str {
        match self {
            Credential::Sec => "SEC_API_KEY",
            Credential::StockData => "STOCKDATA_API_KEY",
            Credential::Fred => "FRED_API_KEY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub sec_api_key: Option<String>,
    pub stockdata_api_key: Option<String>,
    pub fred_api_key: Option<String>,
    pub sec_base_url: String,
    pub stockdata_base_url: String,
    pub fred_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            db_path: non_empty("CVR_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            sec_api_key: non_empty(Credential::Sec.env_var()),
            stockdata_api_key: non_empty(Credential::StockData.env_var()),
            fred_api_key: non_empty(Credential::Fred.env_var()),
            sec_base_url: non_empty("SEC_BASE_URL").unwrap_or_else(|| DEFAULT_SEC_BASE_URL.to_string()),
            stockdata_base_url: non_empty("STOCKDATA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_STOCKDATA_BASE_URL.to_string()),
            fred_base_url: non_empty("FRED_BASE_URL").unwrap_or_else(|| DEFAULT_FRED_BASE_URL.to_string()),
        }
    }

    /// The key for `credential`, or a configuration error if it is missing or
    /// still a `YOUR_...` placeholder.
    pub fn require(&self, credential: Credential) -> Result<&str, AppError> {
        let value = match credential {
            Credential::Sec => self.sec_api_key.as_deref(),
            Credential::StockData => self.stockdata_api_key.as_deref(),
            Credential::Fred => self.fred_api_key.as_deref(),
        };

        match value {
            Some(key) if !key.starts_with("YOUR_") => Ok(key),
            Some(_) => Err(AppError::config(format!(
                "{} is still a placeholder value (environment or .env).",
                credential.env_var()
            ))),
            None => Err(AppError::config(format!(
                "Missing {} in environment (.env).",
                credential.env_var()
            ))),
        }
    }

    /// Check several credentials at once, before any step runs.
    pub fn require_all(&self, credentials: &[Credential]) -> Result<(), AppError> {
        for &credential in credentials {
            self.require(credential)?;
        }
        Ok(())
    }
}
