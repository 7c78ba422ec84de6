//! Raw provider rows to a validated `PriceSeries`.

use super::provider::{DataError, DataProvider, FetchRequest, FetchResult};
use crate::domain::{PriceBar, PriceSeries};
use crate::error::EngineError;
use std::collections::BTreeMap;
use tracing::debug;

/// Sort ascending, keep the last row per date, drop void or inverted bars
/// and anything outside the requested range.
pub fn ingest(result: FetchResult, request: &FetchRequest) -> Result<PriceSeries, EngineError> {
    let raw = result.bars.len();
    let mut by_date: BTreeMap<_, PriceBar> = BTreeMap::new();
    for bar in result.bars {
        if !bar.is_sane() || bar.date < request.start || bar.date > request.end {
            continue;
        }
        by_date.insert(bar.date, bar);
    }
    let bars: Vec<PriceBar> = by_date.into_values().collect();
    debug!(symbol = %result.symbol, raw, kept = bars.len(), "ingested bars");

    if bars.is_empty() {
        return Err(DataError::NoData {
            symbol: request.symbol.clone(),
            start: request.start,
            end: request.end,
        }
        .into());
    }
    Ok(PriceSeries::new(result.symbol, bars)?)
}

/// Fetch and ingest in one step. Every failure comes back as an `EngineError`
/// whose `is_data_problem()` is true.
pub fn fetch_series(provider: &dyn DataProvider, request: &FetchRequest) -> Result<PriceSeries, EngineError> {
    let result = provider.fetch(request)?;
    ingest(result, request)
}
