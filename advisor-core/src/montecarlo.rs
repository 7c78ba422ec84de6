//! Monte-Carlo bust/goal estimator.
//!
//! Each simulated path starts at 1.0 and compounds daily returns drawn
//! uniformly, with replacement, from the observed history (a plain bootstrap,
//! no parametric model). A path *busts* when it first touches `1 - bust` and
//! *reaches goal* when it first touches `1 + goal`; whichever happens first
//! decides the path, so every path lands in exactly one of bust, goal or
//! neither. The horizon equals the number of observed returns.

use crate::config::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Simulated odds for one (bust, goal, horizon, simulations) tuple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskEstimate {
    pub bust_probability: f64,
    pub goal_probability: f64,
    pub bust: f64,
    pub goal: f64,
    pub horizon: usize,
    pub simulations: usize,
    /// The history had no usable price movement; probabilities are exact, not sampled.
    pub degenerate: bool,
}

impl RiskEstimate {
    /// Probability that a path hits neither threshold within the horizon.
    pub fn neither_probability(&self) -> f64 {
        (1.0 - self.bust_probability - self.goal_probability).max(0.0)
    }
}

/// How a single simulated path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    Bust,
    Goal,
    Neither,
}

/// Daily percentage returns of a close series.
///
/// The first return is 0. A step whose previous close is not a positive
/// finite number, or whose current close is not finite, also yields 0.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }
    std::iter::once(0.0)
        .chain(closes.windows(2).map(|w| {
            if w[0].is_finite() && w[0] > 0.0 && w[1].is_finite() {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        }))
        .collect()
}

/// Race one path against both thresholds.
pub fn simulate_path<R: Rng + ?Sized>(
    returns: &[f64],
    horizon: usize,
    bust_level: f64,
    goal_level: f64,
    rng: &mut R,
) -> PathOutcome {
    if returns.is_empty() {
        return PathOutcome::Neither;
    }
    let mut value = 1.0;
    for _ in 0..horizon {
        value *= 1.0 + returns[rng.gen_range(0..returns.len())];
        if value <= bust_level {
            return PathOutcome::Bust;
        }
        if value >= goal_level {
            return PathOutcome::Goal;
        }
    }
    PathOutcome::Neither
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloRiskSimulator {
    simulations: usize,
}

impl MonteCarloRiskSimulator {
    pub fn new(simulations: usize) -> Result<Self, ConfigError> {
        if simulations == 0 {
            return Err(ConfigError::NotPositive {
                field: "simulations",
            });
        }
        Ok(Self { simulations })
    }

    pub fn simulations(&self) -> usize {
        self.simulations
    }

    /// Estimate bust and goal probabilities from a close history.
    ///
    /// `bust` and `goal` are fractions of the starting price: `bust` in (0, 1],
    /// `goal` > 0. The draws come from `rng` only, so the same seed and inputs
    /// always give the same estimate.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        closes: &[f64],
        bust: f64,
        goal: f64,
        rng: &mut R,
    ) -> Result<RiskEstimate, ConfigError> {
        if !(bust.is_finite() && bust > 0.0 && bust <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "bust",
                value: bust,
                min: 0.0,
                max: 1.0,
            });
        }
        if !goal.is_finite() || goal <= 0.0 {
            return Err(ConfigError::NotPositive { field: "goal" });
        }

        let returns = daily_returns(closes);
        let horizon = returns.len();
        let mut estimate = RiskEstimate {
            bust_probability: 0.0,
            goal_probability: 0.0,
            bust,
            goal,
            horizon,
            simulations: self.simulations,
            degenerate: false,
        };

        // A path of zero returns never leaves 1.0, so neither threshold is touched.
        if returns.iter().all(|r| *r == 0.0) {
            debug!(horizon, bust, goal, "zero-variance history, skipping simulation");
            estimate.degenerate = true;
            return Ok(estimate);
        }

        let (bust_level, goal_level) = (1.0 - bust, 1.0 + goal);
        let mut busts = 0usize;
        let mut goals = 0usize;
        for _ in 0..self.simulations {
            match simulate_path(&returns, horizon, bust_level, goal_level, rng) {
                PathOutcome::Bust => busts += 1,
                PathOutcome::Goal => goals += 1,
                PathOutcome::Neither => {}
            }
        }

        estimate.bust_probability = busts as f64 / self.simulations as f64;
        estimate.goal_probability = goals as f64 / self.simulations as f64;
        debug!(
            horizon,
            bust,
            goal,
            bust_probability = estimate.bust_probability,
            goal_probability = estimate.goal_probability,
            "simulated bust/goal odds"
        );
        Ok(estimate)
    }
}
