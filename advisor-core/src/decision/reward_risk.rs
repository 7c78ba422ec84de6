//! Reward/risk ratio and the goal sweep that selects it.
//!
//! ratio = (goal_probability / n) * goal * price / (bust_probability * (price - stop_loss))
//!
//! The sweep walks n = 1..=max_steps with goal = n * step. For each step it
//! takes a fresh bust/goal estimate, averages the ratio over every close in the
//! history, and stops at the first step whose mean exceeds the threshold. The
//! reported ratio is the one at the last close for that step.

use crate::config::{ConfigError, EngineConfig};
use crate::montecarlo::RiskEstimate;
use serde::{Deserialize, Serialize};

/// Outcome of a successful sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardRisk {
    /// Ratio at the last close.
    pub ratio: f64,
    /// Sweep step that qualified.
    pub step: u32,
    /// Goal fraction used at that step.
    pub goal: f64,
    /// Mean ratio over the history at that step.
    pub mean_ratio: f64,
    pub estimate: RiskEstimate,
}

/// Ratio for one price level. `None` when the stop is not below the price
/// or the result is not a finite number.
pub fn ratio(
    goal_probability: f64,
    bust_probability: f64,
    step: u32,
    goal: f64,
    price: f64,
    stop_loss: f64,
) -> Option<f64> {
    let risk = price - stop_loss;
    if step == 0 || risk <= 0.0 || bust_probability <= 0.0 {
        return None;
    }
    let value = (goal_probability / f64::from(step)) * goal * price / (bust_probability * risk);
    value.is_finite().then_some(value)
}

/// Bust probability used in the denominator.
///
/// A sampled zero only means no bust was seen in `simulations` paths, so the
/// estimate is floored at one path's worth of probability.
pub fn bust_floor(estimate: &RiskEstimate) -> f64 {
    estimate
        .bust_probability
        .max(1.0 / estimate.simulations.max(1) as f64)
}

/// Score one sweep step against the history.
pub fn score_step(
    step: u32,
    estimate: &RiskEstimate,
    closes: &[f64],
    stop_loss: f64,
    last_close: f64,
) -> Option<(f64, f64)> {
    let bust_p = bust_floor(estimate);
    let goal_p = estimate.goal_probability;
    let ratios: Vec<f64> = closes
        .iter()
        .filter_map(|&c| ratio(goal_p, bust_p, step, estimate.goal, c, stop_loss))
        .collect();
    if ratios.is_empty() {
        return None;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    let at_last = ratio(goal_p, bust_p, step, estimate.goal, last_close, stop_loss)?;
    Some((at_last, mean))
}

/// Run the sweep. `estimate_at(step, goal)` supplies a fresh estimate per step.
pub fn sweep<F>(
    config: &EngineConfig,
    closes: &[f64],
    stop_loss: f64,
    last_close: f64,
    mut estimate_at: F,
) -> Result<Option<RewardRisk>, ConfigError>
where
    F: FnMut(u32, f64) -> Result<RiskEstimate, ConfigError>,
{
    let max_steps = u32::try_from(config.reward_risk_max_steps).unwrap_or(u32::MAX);
    for step in 1..=max_steps {
        let goal = config.reward_risk_step * f64::from(step);
        let estimate = estimate_at(step, goal)?;
        let Some((at_last, mean)) = score_step(step, &estimate, closes, stop_loss, last_close)
        else {
            continue;
        };
        if mean > config.reward_risk_mean_threshold {
            return Ok(Some(RewardRisk {
                ratio: at_last,
                step,
                goal,
                mean_ratio: mean,
                estimate,
            }));
        }
    }
    Ok(None)
}
