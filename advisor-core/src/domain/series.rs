//! PriceSeries: ordered daily bars for one symbol.

use super::bar::PriceBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a series from bars that break ordering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bars out of order at index {index}: {date} follows {previous}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("duplicate bar date {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("symbol must not be empty")]
    EmptySymbol,
}

/// Ordered sequence of bars for one symbol.
///
/// Invariant: dates are strictly increasing (sorted, no duplicates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting unsorted or duplicated dates.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(SeriesError::EmptySymbol);
        }
        for (index, pair) in bars.windows(2).enumerate() {
            let (previous, date) = (pair[0].date, pair[1].date);
            if date == previous {
                return Err(SeriesError::DuplicateDate {
                    index: index + 1,
                    date,
                });
            }
            if date < previous {
                return Err(SeriesError::OutOfOrder {
                    index: index + 1,
                    previous,
                    date,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Bars dated on or after `date`. Dates are sorted, so this is a binary search.
    pub fn bars_since(&self, date: NaiveDate) -> &[PriceBar] {
        let start = self.bars.partition_point(|b| b.date < date);
        &self.bars[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10,
        }
    }

    #[test]
    fn accepts_strictly_increasing_dates() {
        let series = PriceSeries::new("SBER", vec![bar(1, 10.0), bar(2, 11.0), bar(4, 12.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().map(|b| b.close), Some(12.0));
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::new("SBER", vec![bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::DuplicateDate { index: 1, .. }));
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let err = PriceSeries::new("SBER", vec![bar(2, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn rejects_empty_symbol() {
        assert_eq!(
            PriceSeries::new(" ", vec![]).unwrap_err(),
            SeriesError::EmptySymbol
        );
    }

    #[test]
    fn bars_since_is_inclusive() {
        let series =
            PriceSeries::new("SBER", vec![bar(1, 10.0), bar(2, 11.0), bar(4, 12.0)]).unwrap();
        let closes = |d: u32| -> Vec<f64> {
            series
                .bars_since(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
                .iter()
                .map(|b| b.close)
                .collect()
        };
        assert_eq!(closes(2), vec![11.0, 12.0]);
        assert_eq!(closes(3), vec![12.0]);
        assert!(closes(5).is_empty());
    }
}
