//! Exponential Moving Average (EMA) of closes.
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//! Seed: EMA[period-1] = SMA of the first `period` closes.
//! Reported lookback: period, matching ATR so both columns start on the same bar.

use super::{mask_warmup, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    /// # Panics
    /// If `period` is zero. `IndicatorFrame::compute` validates the period first.
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        mask_warmup(ema_of_series(&closes, self.period), self.period)
    }
}

/// Raw EMA of an arbitrary series, seeded at index `period - 1`.
///
/// A non-finite value inside the seed window leaves the whole output empty;
/// one after the seed ends the series there.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let seed_window = &values[..period];
    if seed_window.iter().any(|v| !v.is_finite()) {
        return result;
    }
    let seed = seed_window.iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..n {
        if !values[i].is_finite() {
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = Some(ema);
        prev = ema;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed at index 2: SMA(10,11,12) = 11.0
        // EMA[3] = 0.5*13 + 0.5*11 = 12.0, EMA[4] = 0.5*14 + 0.5*12 = 13.0
        let raw = ema_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(raw[0].is_none() && raw[1].is_none());
        assert_approx(raw[2].unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(raw[3].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(raw[4].unwrap(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn indicator_masks_first_period_bars() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&bars);
        assert!(result[..3].iter().all(Option::is_none));
        assert_approx(result[3].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_in_seed_produces_nothing() {
        let raw = ema_of_series(&[10.0, f64::NAN, 12.0, 13.0, 14.0], 3);
        assert!(raw.iter().all(Option::is_none));
    }

    #[test]
    fn ema_nan_after_seed_ends_series() {
        let raw = ema_of_series(&[10.0, 11.0, 12.0, f64::INFINITY, 14.0], 3);
        assert_approx(raw[2].unwrap(), 11.0, DEFAULT_EPSILON);
        assert!(raw[3].is_none());
        assert!(raw[4].is_none());
    }

    #[test]
    fn ema_period_1_follows_close() {
        let raw = ema_of_series(&[100.0, 200.0, 300.0], 1);
        assert_eq!(raw, vec![Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 20);
        assert_eq!(Ema::new(5).name(), "ema_5");
    }
}
