//! Watchlist entries and the per-asset inputs they carry.

use advisor_core::data::{AssetType, FetchRequest};
use advisor_core::AssetInputs;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One asset to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    #[serde(default)]
    pub asset_type: AssetType,
    /// Price the asset was bought at, if held. Enables the sell check.
    #[serde(default)]
    pub entry_price: Option<f64>,
    /// Buy ceiling.
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub dividend_yield: f64,
}

impl WatchlistEntry {
    pub fn new(symbol: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            symbol: symbol.into(),
            asset_type,
            entry_price: None,
            limit: None,
            dividend_yield: 0.0,
        }
    }

    pub fn inputs(&self) -> AssetInputs {
        AssetInputs::new(
            self.entry_price.unwrap_or(0.0),
            self.limit.unwrap_or(0.0),
            self.dividend_yield,
        )
    }

    /// History window ending at `as_of`. `None` when the window is negative
    /// or starts before the earliest representable date.
    pub fn request(&self, as_of: NaiveDate, history_days: i64) -> Option<FetchRequest> {
        let days = u64::try_from(history_days).ok()?;
        let start = as_of.checked_sub_days(Days::new(days))?;
        Some(FetchRequest::new(self.symbol.clone(), self.asset_type, start, as_of))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_entry_price_is_not_held() {
        let mut entry = WatchlistEntry::new("GAZP", AssetType::Stock);
        entry.entry_price = Some(0.0);
        entry.limit = Some(250.0);
        let inputs = entry.inputs();
        assert_eq!(inputs.entry_price, None);
        assert_eq!(inputs.limit, Some(250.0));
    }

    #[test]
    fn request_spans_history_window() {
        let entry = WatchlistEntry::new("USD000UTSTOM", AssetType::Currency);
        let as_of = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let req = entry.request(as_of, 31).unwrap();
        assert_eq!(req.start, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(req.end, as_of);
        assert_eq!(req.asset_type, AssetType::Currency);
    }

    #[test]
    fn out_of_range_window_has_no_request() {
        let entry = WatchlistEntry::new("SBER", AssetType::Stock);
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(entry.request(as_of, 100_000_000).is_none());
        assert!(entry.request(as_of, -1).is_none());
    }
}
