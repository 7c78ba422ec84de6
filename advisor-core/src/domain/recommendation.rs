//! Recommendation: the persisted output of an evaluation pass.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the engine suggests doing with an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
            Action::Hold => write!(f, "hold"),
        }
    }
}

/// A buy or sell call for one symbol, as of one session.
///
/// Immutable once created. `symbol`, `stop_loss`, `exit_price` and `as_of`
/// are the fields the outcome validator reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub action: Action,
    /// Price the call is made at (last close for buys, recorded entry for sells).
    pub entry_price: f64,
    pub stop_loss: f64,
    /// Target price; a close above it counts as success.
    pub exit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_risk_ratio: Option<f64>,
    #[serde(default)]
    pub bust_probability: f64,
    #[serde(default)]
    pub goal_probability: f64,
    /// Realized gain in percent, only for sell calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_pct: Option<f64>,
    /// Date of the last session the call was based on.
    pub as_of: NaiveDate,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Recommendation {
    /// Distance from entry to stop as a fraction of entry.
    pub fn stop_loss_pct(&self) -> f64 {
        if self.entry_price > 0.0 {
            1.0 - self.stop_loss / self.entry_price
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recommendation {
        Recommendation {
            symbol: "GAZP".into(),
            action: Action::Buy,
            entry_price: 100.0,
            stop_loss: 80.0,
            exit_price: 110.0,
            fair_price: None,
            reward_risk_ratio: Some(12.5),
            bust_probability: 0.02,
            goal_probability: 0.6,
            gain_pct: None,
            as_of: NaiveDate::from_ymd_opt(2018, 11, 7).unwrap(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn serializes_minimum_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["symbol"], "GAZP");
        assert_eq!(json["action"], "buy");
        assert_eq!(json["stop_loss"], 80.0);
        assert_eq!(json["exit_price"], 110.0);
        assert_eq!(json["as_of"], "2018-11-07");
        assert!(json.get("fair_price").is_none());
    }

    #[test]
    fn reads_minimal_record() {
        let raw = r#"{"symbol":"LKOH","action":"buy","entry_price":50.0,
            "stop_loss":40.0,"exit_price":55.0,"as_of":"2019-01-10"}"#;
        let rec: Recommendation = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.symbol, "LKOH");
        assert_eq!(rec.reward_risk_ratio, None);
        assert_eq!(rec.bust_probability, 0.0);
    }

    #[test]
    fn stop_loss_pct_from_entry() {
        assert!((sample().stop_loss_pct() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Sell.to_string(), "sell");
    }
}
