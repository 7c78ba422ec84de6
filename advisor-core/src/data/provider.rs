//! Data provider trait and structured error types.
//!
//! The engine never fetches anything itself. Callers pick a provider, fetch
//! bars, and hand the engine a validated series.

use crate::domain::PriceBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failures while fetching or parsing price data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no bars for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("unknown asset type '{0}'")]
    UnknownAssetType(String),
}

/// Asset class of a watchlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Stock,
    Etf,
    Currency,
    Futures,
}

impl AssetType {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Etf => "etf",
            AssetType::Currency => "currency",
            AssetType::Futures => "futures",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stock" => Ok(AssetType::Stock),
            "etf" => Ok(AssetType::Etf),
            "currency" => Ok(AssetType::Currency),
            "futures" => Ok(AssetType::Futures),
            other => Err(DataError::UnknownAssetType(other.to_string())),
        }
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Csv,
    Yahoo,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Csv => "csv",
            DataSource::Yahoo => "yahoo",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One symbol over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub asset_type: AssetType,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, asset_type: AssetType, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            asset_type,
            start,
            end,
        }
    }
}

/// Raw rows as the provider returned them: possibly unsorted, duplicated or void.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
}

/// A source of daily OHLCV bars.
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError>;
}
