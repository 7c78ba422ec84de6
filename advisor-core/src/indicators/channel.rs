//! Volatility channel (Keltner-style) and anomaly counting.
//!
//! - Lower: EMA(period) - k * ATR(period)
//! - Upper: EMA(period) + k * ATR(period)
//!
//! A band value exists only where both EMA and ATR exist.

use serde::{Deserialize, Serialize};

/// Lower and upper channel bounds aligned to the bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub lower: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
}

impl Channel {
    pub fn compute(ema: &[Option<f64>], atr: &[Option<f64>], multiplier: f64) -> Self {
        let (lower, upper) = ema
            .iter()
            .zip(atr)
            .map(|pair| match pair {
                (Some(mid), Some(range)) => (
                    Some(mid - multiplier * range),
                    Some(mid + multiplier * range),
                ),
                _ => (None, None),
            })
            .unzip();
        Self { lower, upper }
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Bounds on the last bar, if available.
    pub fn last(&self) -> Option<(f64, f64)> {
        match (self.lower.last(), self.upper.last()) {
            (Some(Some(lo)), Some(Some(hi))) => Some((*lo, *hi)),
            _ => None,
        }
    }
}

/// Count bars whose close lies strictly outside `[ema - ratio*atr, ema + ratio*atr]`.
///
/// Bars missing either EMA or ATR are not counted.
pub fn anomaly_count(closes: &[f64], ema: &[Option<f64>], atr: &[Option<f64>], ratio: f64) -> usize {
    closes
        .iter()
        .zip(ema.iter().zip(atr))
        .filter(|(close, pair)| match pair {
            (Some(mid), Some(range)) => {
                let band = ratio * *range;
                **close < mid - band || **close > mid + band
            }
            _ => false,
        })
        .count()
}
