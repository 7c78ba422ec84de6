//! Watchlist batch evaluation.
//!
//! Each asset is fetched and evaluated independently on the rayon pool.
//! A failing asset becomes a `Skipped` or `Excluded` outcome and never stops
//! the others. Report order follows the watchlist.

use advisor_core::data::{fetch_series, DataProvider, DataSource};
use advisor_core::decision::Evaluation;
use advisor_core::domain::{Action, Recommendation};
use advisor_core::{DecisionEngine, EngineError, RngHierarchy};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AdvisorConfig;
use crate::watchlist::WatchlistEntry;

/// Per-asset result of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssetOutcome {
    /// Walked the state machine; may still have ended in `Excluded`.
    Evaluated(Box<Evaluation>),
    /// Could not be evaluated at all.
    Skipped { symbol: String, reason: String },
}

impl AssetOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            AssetOutcome::Evaluated(eval) => &eval.symbol,
            AssetOutcome::Skipped { symbol, .. } => symbol,
        }
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            AssetOutcome::Evaluated(eval) => Some(eval),
            AssetOutcome::Skipped { .. } => None,
        }
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        self.evaluation()
            .map(|e| e.recommendations.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub label: String,
    pub source: DataSource,
    pub as_of: NaiveDate,
    pub outcomes: Vec<AssetOutcome>,
}

impl BatchReport {
    fn with_action(&self, action: Action) -> Vec<&Recommendation> {
        self.outcomes
            .iter()
            .flat_map(AssetOutcome::recommendations)
            .filter(|r| r.action == action)
            .collect()
    }

    /// Every qualifying buy, unranked. Includes held assets that also sell.
    pub fn buys(&self) -> Vec<&Recommendation> {
        self.with_action(Action::Buy)
    }

    pub fn sells(&self) -> Vec<&Recommendation> {
        self.with_action(Action::Sell)
    }

    /// Buys ranked by reward/risk ratio, best first.
    pub fn ranked_buys(&self) -> Vec<&Recommendation> {
        let mut buys = self.buys();
        buys.sort_by(|a, b| {
            let (ra, rb) = (a.reward_risk_ratio.unwrap_or(0.0), b.reward_risk_ratio.unwrap_or(0.0));
            rb.total_cmp(&ra)
        });
        buys
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            AssetOutcome::Skipped { symbol, reason } => Some((symbol.as_str(), reason.as_str())),
            AssetOutcome::Evaluated(_) => None,
        })
    }

    pub fn excluded(&self) -> impl Iterator<Item = &Evaluation> {
        self.outcomes
            .iter()
            .filter_map(AssetOutcome::evaluation)
            .filter(|e| e.is_excluded())
    }
}

/// Fetch and evaluate one watchlist entry.
pub fn evaluate_entry(
    engine: &DecisionEngine,
    provider: &dyn DataProvider,
    rngs: &RngHierarchy,
    entry: &WatchlistEntry,
    as_of: NaiveDate,
    history_days: i64,
) -> AssetOutcome {
    let symbol = entry.symbol.as_str();
    let Some(request) = entry.request(as_of, history_days) else {
        warn!(symbol, history_days, %as_of, "history window out of range, skipping");
        return AssetOutcome::Skipped {
            symbol: symbol.to_string(),
            reason: format!("history window of {history_days} days before {as_of} is out of range"),
        };
    };

    let series = match fetch_series(provider, &request) {
        Ok(series) => series,
        Err(EngineError::DataUnavailable(err)) => {
            warn!(symbol, provider = provider.name(), error = %err, "data unavailable, excluding");
            return AssetOutcome::Evaluated(Box::new(Evaluation::unavailable(symbol, err.to_string())));
        }
        Err(err) => {
            warn!(symbol, error = %err, "skipping asset");
            return AssetOutcome::Skipped {
                symbol: symbol.to_string(),
                reason: err.to_string(),
            };
        }
    };

    let mut rng = rngs.for_session(symbol, as_of);
    match engine.evaluate(&series, &entry.inputs(), &mut rng) {
        Ok(eval) => {
            info!(
                symbol,
                state = %eval.state,
                action = %eval.action(),
                trend = ?eval.trend(),
                anomaly = eval.has_anomaly(),
                "evaluated"
            );
            AssetOutcome::Evaluated(Box::new(eval))
        }
        Err(err) => {
            warn!(symbol, error = %err, "evaluation failed, skipping");
            AssetOutcome::Skipped {
                symbol: symbol.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Evaluate every watchlist entry as of `as_of`.
pub fn run_batch(
    config: &AdvisorConfig,
    provider: &dyn DataProvider,
    as_of: NaiveDate,
) -> Result<BatchReport, advisor_core::ConfigError> {
    let engine = DecisionEngine::new(config.engine.clone())?;
    let rngs = RngHierarchy::new(config.seed);
    let history_days = config.data.history_days;

    info!(
        label = %config.label,
        assets = config.watchlist.len(),
        provider = provider.name(),
        %as_of,
        "starting batch"
    );

    let outcomes: Vec<AssetOutcome> = config
        .watchlist
        .par_iter()
        .map(|entry| evaluate_entry(&engine, provider, &rngs, entry, as_of, history_days))
        .collect();

    let report = BatchReport {
        label: config.label.clone(),
        source: provider.source(),
        as_of,
        outcomes,
    };
    info!(
        buys = report.buys().len(),
        sells = report.sells().len(),
        excluded = report.excluded().count(),
        skipped = report.skipped().count(),
        "batch complete"
    );
    Ok(report)
}
