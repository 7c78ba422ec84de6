//! Advisor configuration file (TOML).
//!
//! ```toml
//! label = "moex-stocks"
//! seed = 42
//! recommendations_dir = "recommendations"
//!
//! [engine]
//! simulations = 10000
//! min_goal = 0.1
//!
//! [data]
//! source = "csv"
//! csv_dir = "data"
//! history_days = 365
//!
//! [[watchlist]]
//! symbol = "SBER"
//! asset_type = "stock"
//! entry_price = 180.0
//! dividend_yield = 0.07
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use advisor_core::data::{CsvProvider, DataError, DataProvider, DataSource, YahooProvider};
use advisor_core::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::watchlist::WatchlistEntry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid engine settings: {0}")]
    Engine(#[from] advisor_core::ConfigError),

    #[error("label must not be empty")]
    EmptyLabel,

    #[error("watchlist lists '{0}' more than once")]
    DuplicateSymbol(String),

    #[error("history_days must be between 1 and {max}, got {days}")]
    HistoryWindow { days: i64, max: i64 },
}

/// Longest history window accepted, in calendar days.
pub const MAX_HISTORY_DAYS: i64 = 36_500;

/// Where price history comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: DataSource,
    /// Root of the CSV layout, used when `source = "csv"`.
    pub csv_dir: PathBuf,
    /// Calendar days of history fetched before the as-of date.
    pub history_days: i64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Csv,
            csv_dir: PathBuf::from("data"),
            history_days: 365,
        }
    }
}

impl DataConfig {
    pub fn provider(&self) -> Result<Box<dyn DataProvider>, DataError> {
        Ok(match self.source {
            DataSource::Csv => Box::new(CsvProvider::new(&self.csv_dir)),
            DataSource::Yahoo => Box::new(YahooProvider::new()?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Names the watchlist in saved recommendation files.
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_recommendations_dir")]
    pub recommendations_dir: PathBuf,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub watchlist: Vec<WatchlistEntry>,
}

fn default_label() -> String {
    "default".into()
}

fn default_seed() -> u64 {
    42
}

fn default_recommendations_dir() -> PathBuf {
    PathBuf::from("recommendations")
}

impl AdvisorConfig {
    /// Parse and validate.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AdvisorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate. Relative directories resolve against the
    /// config file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.recommendations_dir.is_relative() {
            self.recommendations_dir = base.join(&self.recommendations_dir);
        }
        if self.data.csv_dir.is_relative() {
            self.data.csv_dir = base.join(&self.data.csv_dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        if !(1..=MAX_HISTORY_DAYS).contains(&self.data.history_days) {
            return Err(ConfigError::HistoryWindow {
                days: self.data.history_days,
                max: MAX_HISTORY_DAYS,
            });
        }
        self.engine.validate()?;

        let mut seen = HashSet::new();
        for entry in &self.watchlist {
            if !seen.insert(entry.symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol(entry.symbol.clone()));
            }
        }
        Ok(())
    }

    pub fn entry(&self, symbol: &str) -> Option<&WatchlistEntry> {
        self.watchlist.iter().find(|e| e.symbol == symbol)
    }
}
