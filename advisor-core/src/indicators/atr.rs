//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (EMA with alpha = 1/period).
//! Lookback: period (needs period+1 bars: the first bar has no previous close).

use super::{mask_warmup, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    /// # Panics
    /// If `period` is zero. `IndicatorFrame::compute` validates the period first.
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
/// Non-finite inputs yield `None`.
pub fn true_range(bars: &[PriceBar]) -> Vec<Option<f64>> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let (h, l) = (bar.high, bar.low);
            if !h.is_finite() || !l.is_finite() {
                return None;
            }
            if i == 0 {
                return Some(h - l);
            }
            let pc = bars[i - 1].close;
            if !pc.is_finite() {
                return None;
            }
            Some((h - l).max((h - pc).abs()).max((l - pc).abs()))
        })
        .collect()
}

/// Apply Wilder smoothing to a series. Alpha = 1/period.
///
/// Seed: mean of the first `period` consecutive available values. A gap after
/// the seed makes every later value unavailable.
pub fn wilder_smooth(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if n < period || period == 0 {
        return result;
    }

    let seed_start = (0..=n - period).find(|&i| values[i..i + period].iter().all(Option::is_some));
    let Some(seed_start) = seed_start else {
        return result;
    };
    let seed_end = seed_start + period;

    let seed = values[seed_start..seed_end].iter().flatten().sum::<f64>() / period as f64;
    result[seed_end - 1] = Some(seed);

    let alpha = 1.0 / period as f64;
    let mut prev = seed;

    for i in seed_end..n {
        let Some(v) = values[i] else {
            return result;
        };
        let smoothed = alpha * v + (1.0 - alpha) * prev;
        result[i] = Some(smoothed);
        prev = smoothed;
    }

    result
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<Option<f64>> {
        let mut tr = true_range(bars);
        // TR[0] is only high-low; start the seed from TR[1] so lookback = period.
        if let Some(first) = tr.first_mut() {
            *first = None;
        }
        mask_warmup(wilder_smooth(&tr, self.period), self.period)
    }
}
