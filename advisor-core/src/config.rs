//! Engine configuration.
//!
//! Every evaluation call receives an explicit `EngineConfig`; nothing is read
//! from process-wide defaults, so batches with different risk appetites can
//! run side by side.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid engine settings. Fatal for the evaluation call that received them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidNumber { field: &'static str, value: f64 },

    #[error("{field} must lie in [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Thresholds, multipliers and lookbacks for one evaluation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lookback for ATR, the channel EMA and the anomaly count.
    pub period: usize,
    pub fast_ema_period: usize,
    pub slow_ema_period: usize,
    /// Channel half-width in ATRs.
    pub channel_multiplier: f64,
    /// Anomaly band half-width in ATRs.
    pub anomaly_ratio: f64,
    /// Stop distance below the last close, in ATRs.
    pub atr_multiplier: f64,
    /// Stop as a fraction of last close when the ATR stop is non-positive.
    pub stop_loss_fallback: f64,
    /// Upside threshold fed to the simulator, also the sell trigger.
    pub min_goal: f64,
    pub accepted_goal_chance: f64,
    pub min_reward_risk_ratio: f64,
    pub simulations: usize,
    /// Share of bars needed to call a trend Up or Down.
    pub trend_threshold: f64,
    /// Goal increment per reward/risk sweep step.
    pub reward_risk_step: f64,
    pub reward_risk_max_steps: usize,
    /// Mean ratio over the series a sweep step must exceed.
    pub reward_risk_mean_threshold: f64,
    /// Yield at which the dividend fair-price model prices an asset. Zero disables it.
    pub fair_price_target_yield: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            period: 5,
            fast_ema_period: 5,
            slow_ema_period: 20,
            channel_multiplier: 2.0,
            anomaly_ratio: 2.0,
            atr_multiplier: 5.0,
            stop_loss_fallback: 0.5,
            min_goal: 0.1,
            accepted_goal_chance: 0.33,
            min_reward_risk_ratio: 10.0,
            simulations: 10_000,
            trend_threshold: 0.85,
            reward_risk_step: 0.1,
            reward_risk_max_steps: 9,
            reward_risk_mean_threshold: 2.0,
            fair_price_target_yield: 0.0,
        }
    }
}

impl EngineConfig {
    /// Bars needed before `period`-lookback indicators exist.
    pub fn required_bars(&self) -> usize {
        self.period + 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_count("period", self.period)?;
        positive_count("fast_ema_period", self.fast_ema_period)?;
        positive_count("slow_ema_period", self.slow_ema_period)?;
        positive_count("simulations", self.simulations)?;
        positive_count("reward_risk_max_steps", self.reward_risk_max_steps)?;

        non_negative("channel_multiplier", self.channel_multiplier)?;
        non_negative("anomaly_ratio", self.anomaly_ratio)?;
        non_negative("atr_multiplier", self.atr_multiplier)?;
        non_negative("min_reward_risk_ratio", self.min_reward_risk_ratio)?;
        non_negative("reward_risk_mean_threshold", self.reward_risk_mean_threshold)?;
        non_negative("fair_price_target_yield", self.fair_price_target_yield)?;

        positive_number("min_goal", self.min_goal)?;
        positive_number("reward_risk_step", self.reward_risk_step)?;

        in_range("accepted_goal_chance", self.accepted_goal_chance, 0.0, 1.0)?;
        in_range("trend_threshold", self.trend_threshold, 0.0, 1.0)?;
        if !(self.stop_loss_fallback > 0.0 && self.stop_loss_fallback < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "stop_loss_fallback",
                value: self.stop_loss_fallback,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

fn positive_count(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive { field });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidNumber { field, value });
    }
    Ok(())
}

fn positive_number(field: &'static str, value: f64) -> Result<(), ConfigError> {
    non_negative(field, value)?;
    if value == 0.0 {
        return Err(ConfigError::NotPositive { field });
    }
    Ok(())
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
