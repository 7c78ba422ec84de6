//! CSV price files on disk.
//!
//! Layout: `{dir}/{asset_type}/{SYMBOL}.csv`, falling back to `{dir}/{SYMBOL}.csv`.
//! Header: `date,open,high,low,close,volume` with ISO dates.

use super::provider::{DataError, DataProvider, DataSource, FetchRequest, FetchResult};
use crate::domain::PriceBar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

impl From<CsvRow> for PriceBar {
    fn from(row: CsvRow) -> Self {
        let volume = row
            .volume
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v.round() as u64)
            .unwrap_or(0);
        PriceBar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First existing candidate path for the request.
    pub fn locate(&self, request: &FetchRequest) -> Option<PathBuf> {
        let file = format!("{}.csv", request.symbol);
        [
            self.dir.join(request.asset_type.as_str()).join(&file),
            self.dir.join(&file),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }

    /// Read every row of one CSV file.
    pub fn read_file(path: &Path) -> Result<Vec<PriceBar>, DataError> {
        let display = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|source| DataError::Io {
            path: display.clone(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        reader
            .deserialize::<CsvRow>()
            .map(|row| {
                row.map(PriceBar::from).map_err(|e| DataError::Parse {
                    path: display.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::Csv
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        let path = self.locate(request).ok_or_else(|| DataError::SymbolNotFound {
            symbol: request.symbol.clone(),
        })?;
        let bars = Self::read_file(&path)?;
        Ok(FetchResult {
            symbol: request.symbol.clone(),
            bars,
            source: DataSource::Csv,
        })
    }
}
