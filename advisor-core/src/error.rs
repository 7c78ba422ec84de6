//! Per-asset error taxonomy.

use crate::config::ConfigError;
use crate::data::DataError;
use crate::domain::SeriesError;
use thiserror::Error;

/// Why one asset could not be evaluated.
///
/// None of these are fatal for a batch: callers turn them into a skip or an
/// exclusion and carry on with the next asset.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("insufficient history: {bars} bars, need at least {required}")]
    InsufficientHistory { bars: usize, required: usize },

    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] DataError),

    #[error("invalid price series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl EngineError {
    /// True for failures caused by the asset's data rather than the caller's settings.
    pub fn is_data_problem(&self) -> bool {
        !matches!(self, EngineError::Configuration(_))
    }
}
