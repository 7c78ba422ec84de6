//! Retroactive check of a saved recommendation against later prices.

use crate::domain::{PriceSeries, Recommendation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a recommendation played out.
///
/// A session counts as a success when it closed above the exit price and as
/// a bust when it closed below the stop. Only sessions on or after the
/// recommendation's `as_of` date are considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub symbol: String,
    pub sessions: usize,
    pub succeeded_count: usize,
    pub busted_count: usize,
    pub first_success_date: Option<NaiveDate>,
    pub first_bust_date: Option<NaiveDate>,
}

impl ValidationReport {
    pub fn succeeded(&self) -> bool {
        self.succeeded_count > 0
    }

    pub fn busted(&self) -> bool {
        self.busted_count > 0
    }

    /// Success reached strictly before any bust.
    pub fn succeeded_first(&self) -> bool {
        match (self.first_success_date, self.first_bust_date) {
            (Some(win), Some(loss)) => win < loss,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

/// Read-only comparison; the recommendation is never modified.
pub fn validate(recommendation: &Recommendation, series: &PriceSeries) -> ValidationReport {
    let mut report = ValidationReport {
        symbol: recommendation.symbol.clone(),
        sessions: 0,
        succeeded_count: 0,
        busted_count: 0,
        first_success_date: None,
        first_bust_date: None,
    };

    for bar in series
        .bars_since(recommendation.as_of)
        .iter()
        .filter(|b| b.close.is_finite())
    {
        report.sessions += 1;
        if bar.close > recommendation.exit_price {
            report.succeeded_count += 1;
            report.first_success_date.get_or_insert(bar.date);
        }
        if bar.close < recommendation.stop_loss {
            report.busted_count += 1;
            report.first_bust_date.get_or_insert(bar.date);
        }
    }
    report
}
