//! Per-asset evaluation state machine and exclusion reasons.
//!
//! ```text
//! Unevaluated -> DataReady -> IndicatorsComputed -> RiskEstimated
//!     -> BuyCandidate | SellCandidate | Hold | Excluded
//! ```
//! `Excluded` is reachable from every non-terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationState {
    Unevaluated,
    DataReady,
    IndicatorsComputed,
    RiskEstimated,
    BuyCandidate,
    SellCandidate,
    Hold,
    Excluded,
}

impl EvaluationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EvaluationState::BuyCandidate
                | EvaluationState::SellCandidate
                | EvaluationState::Hold
                | EvaluationState::Excluded
        )
    }

    pub fn can_advance_to(self, next: EvaluationState) -> bool {
        use EvaluationState::*;
        if self.is_terminal() {
            return false;
        }
        if next == Excluded {
            return true;
        }
        matches!(
            (self, next),
            (Unevaluated, DataReady)
                | (DataReady, IndicatorsComputed)
                | (IndicatorsComputed, RiskEstimated)
                | (RiskEstimated, BuyCandidate)
                | (RiskEstimated, SellCandidate)
                | (RiskEstimated, Hold)
        )
    }
}

impl fmt::Display for EvaluationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EvaluationState::Unevaluated => "unevaluated",
            EvaluationState::DataReady => "data_ready",
            EvaluationState::IndicatorsComputed => "indicators_computed",
            EvaluationState::RiskEstimated => "risk_estimated",
            EvaluationState::BuyCandidate => "buy_candidate",
            EvaluationState::SellCandidate => "sell_candidate",
            EvaluationState::Hold => "hold",
            EvaluationState::Excluded => "excluded",
        };
        f.pad(label)
    }
}

/// Why an asset ended in `Excluded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    InsufficientHistory { bars: usize, required: usize },
    DataUnavailable { reason: String },
    InvalidLastPrice { price: f64 },
    /// Enough bars, but non-finite prices left no ATR or EMA on the last bar.
    IndicatorsUnavailable { non_finite_bars: usize },
    AbovePriceLimit { price: f64, limit: f64 },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::InsufficientHistory { bars, required } => {
                write!(f, "insufficient history: {bars} usable bars, need {required}")
            }
            ExclusionReason::DataUnavailable { reason } => write!(f, "data unavailable: {reason}"),
            ExclusionReason::InvalidLastPrice { price } => {
                write!(f, "last close {price} is not a positive price")
            }
            ExclusionReason::IndicatorsUnavailable { non_finite_bars } => write!(
                f,
                "indicators unavailable on the last bar ({non_finite_bars} bars with non-finite prices)"
            ),
            ExclusionReason::AbovePriceLimit { price, limit } => {
                write!(f, "price {price:.2} above limit {limit:.2}")
            }
        }
    }
}
