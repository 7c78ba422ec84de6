//! Correlation and beta between assets.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use advisor_core::stats::{beta, pct_change, pearson_correlation};
use advisor_core::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closes of both series on the dates they share, ascending.
pub fn aligned_closes(a: &PriceSeries, b: &PriceSeries) -> Vec<(NaiveDate, f64, f64)> {
    let left: BTreeMap<NaiveDate, f64> = a.bars().iter().map(|bar| (bar.date, bar.close)).collect();
    b.bars()
        .iter()
        .filter_map(|bar| left.get(&bar.date).map(|&ca| (bar.date, ca, bar.close)))
        .collect()
}

/// Pearson correlation of closes over the shared dates.
pub fn correlation(a: &PriceSeries, b: &PriceSeries) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = aligned_closes(a, b)
        .into_iter()
        .map(|(_, x, y)| (x, y))
        .unzip();
    pearson_correlation(&xs, &ys)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaRow {
    pub symbol: String,
    /// Correlation of daily percentage changes with the benchmark.
    pub correlation: Option<f64>,
    pub beta: Option<f64>,
    pub observations: usize,
}

/// Correlation and beta of daily changes against `benchmark`, least correlated first.
pub fn beta_table(benchmark: &PriceSeries, assets: &[PriceSeries]) -> Vec<BetaRow> {
    let mut rows: Vec<BetaRow> = assets
        .iter()
        .map(|asset| {
            let (market, own): (Vec<f64>, Vec<f64>) = aligned_closes(benchmark, asset)
                .into_iter()
                .map(|(_, m, a)| (m, a))
                .unzip();
            let (market, own) = paired_changes(&market, &own);
            BetaRow {
                symbol: asset.symbol().to_string(),
                correlation: pearson_correlation(&market, &own),
                beta: beta(&market, &own),
                observations: market.len(),
            }
        })
        .collect();
    rows.sort_by(|a, b| match (a.correlation, b.correlation) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.symbol.cmp(&b.symbol),
    });
    rows
}

/// Daily changes of two aligned close columns, dropping any day where
/// either side is undefined.
fn paired_changes(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    a.windows(2)
        .zip(b.windows(2))
        .filter_map(|(wa, wb)| {
            let ca = pct_change(wa);
            let cb = pct_change(wb);
            Some((*ca.first()?, *cb.first()?))
        })
        .unzip()
}
