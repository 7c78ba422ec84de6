//! Indicator computations over a `PriceSeries`.
//!
//! Every series is aligned to the input bars. Positions inside an
//! indicator's warm-up window hold `None`, never a placeholder number.

pub mod atr;
pub mod channel;
pub mod ema;
pub mod frame;

pub use atr::Atr;
pub use channel::{anomaly_count, Channel};
pub use ema::Ema;
pub use frame::IndicatorFrame;

use crate::domain::PriceBar;

/// A lookback-based indicator.
///
/// Output has the same length as the input bars. The first `lookback()`
/// values are `None`; later values may also be `None` when the inputs at or
/// before that bar are not finite.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "atr_5").
    fn name(&self) -> &str;

    /// Number of leading bars without a value.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>>;
}

/// Blank out the first `lookback` positions.
pub(crate) fn mask_warmup(mut values: Vec<Option<f64>>, lookback: usize) -> Vec<Option<f64>> {
    for value in values.iter_mut().take(lookback) {
        *value = None;
    }
    values
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Bars with explicit OHLC tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| PriceBar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
