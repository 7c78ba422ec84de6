//! Coarse trend regime from a fast and a slow EMA.
//!
//! Context only: the label is displayed alongside a recommendation and never
//! gates a buy or sell.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Sideways => write!(f, "sideways"),
        }
    }
}

/// Up/down bar tallies behind a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrendCounts {
    /// Bars where both EMAs exist.
    pub compared: usize,
    /// Bars with fast >= slow.
    pub up: usize,
    /// Bars with fast <= slow.
    pub down: usize,
}

impl TrendCounts {
    pub fn tally(fast: &[Option<f64>], slow: &[Option<f64>]) -> Self {
        let mut counts = Self::default();
        for pair in fast.iter().zip(slow) {
            if let (Some(f), Some(s)) = pair {
                counts.compared += 1;
                if f >= s {
                    counts.up += 1;
                }
                if f <= s {
                    counts.down += 1;
                }
            }
        }
        counts
    }

    pub fn classify(&self, threshold: f64) -> Trend {
        if self.compared == 0 {
            return Trend::Sideways;
        }
        let total = self.compared as f64;
        if self.up as f64 / total >= threshold {
            Trend::Up
        } else if self.down as f64 / total >= threshold {
            Trend::Down
        } else {
            Trend::Sideways
        }
    }
}

/// Classify the overall trend. Equal EMAs count as both up and down.
pub fn classify(fast: &[Option<f64>], slow: &[Option<f64>], threshold: f64) -> Trend {
    TrendCounts::tally(fast, slow).classify(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn mostly_above_is_up() {
        let fast = some(&[11.0; 9].iter().copied().chain([9.0]).collect::<Vec<_>>());
        let slow = some(&[10.0; 10]);
        // 9 of 10 = 90% up
        assert_eq!(classify(&fast, &slow, 0.85), Trend::Up);
    }

    #[test]
    fn mostly_below_is_down() {
        let fast = some(&[9.0; 10]);
        let slow = some(&[10.0; 10]);
        assert_eq!(classify(&fast, &slow, 0.85), Trend::Down);
    }

    #[test]
    fn mixed_is_sideways() {
        let fast = some(&[9.0, 11.0, 9.0, 11.0]);
        let slow = some(&[10.0; 4]);
        assert_eq!(classify(&fast, &slow, 0.85), Trend::Sideways);
    }

    #[test]
    fn equal_emas_resolve_up_first() {
        let flat = some(&[10.0; 5]);
        let counts = TrendCounts::tally(&flat, &flat);
        assert_eq!(counts.up, 5);
        assert_eq!(counts.down, 5);
        assert_eq!(counts.classify(0.85), Trend::Up);
    }

    #[test]
    fn warmup_bars_are_ignored() {
        let fast = vec![None, None, Some(11.0), Some(12.0)];
        let slow = vec![None, Some(10.0), Some(10.0), Some(10.0)];
        let counts = TrendCounts::tally(&fast, &slow);
        assert_eq!(counts.compared, 2);
        assert_eq!(counts.classify(0.85), Trend::Up);
    }

    #[test]
    fn nothing_comparable_is_sideways() {
        assert_eq!(classify(&[None], &[None], 0.85), Trend::Sideways);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 17 of 20 = 0.85 exactly
        let mut fast = vec![Some(11.0); 17];
        fast.extend([Some(9.0); 3]);
        let slow = vec![Some(10.0); 20];
        assert_eq!(classify(&fast, &slow, 0.85), Trend::Up);
    }
}
