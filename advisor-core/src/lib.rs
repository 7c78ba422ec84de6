//! Advisor Core: indicators, trend, Monte-Carlo risk and the decision engine.
//!
//! - Domain types (bars, series, recommendations)
//! - Indicators with explicit warm-up markers (ATR, EMA, channel, anomalies)
//! - Trend classification from a fast/slow EMA pair
//! - Bootstrap Monte-Carlo bust/goal estimator with injectable randomness
//! - Decision engine and per-asset state machine
//! - Outcome validation of saved recommendations
//! - Data provider seam (CSV files, Yahoo chart API)

pub mod config;
pub mod data;
pub mod decision;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod montecarlo;
pub mod rng;
pub mod stats;
pub mod trend;
pub mod validator;

pub use config::{ConfigError, EngineConfig};
pub use decision::{AssetInputs, DecisionEngine, Evaluation, EvaluationState, ExclusionReason};
pub use domain::{Action, PriceBar, PriceSeries, Recommendation};
pub use error::EngineError;
pub use montecarlo::{MonteCarloRiskSimulator, RiskEstimate};
pub use rng::RngHierarchy;
pub use validator::{validate, ValidationReport};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a batch shares across worker threads is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceSeries>();
        require_sync::<PriceSeries>();
        require_send::<Recommendation>();
        require_sync::<Recommendation>();
        require_send::<EngineConfig>();
        require_sync::<EngineConfig>();
        require_send::<DecisionEngine>();
        require_sync::<DecisionEngine>();
        require_send::<Evaluation>();
        require_sync::<Evaluation>();
        require_send::<RngHierarchy>();
        require_sync::<RngHierarchy>();
        require_send::<EngineError>();
        require_sync::<EngineError>();
        require_send::<data::CsvProvider>();
        require_sync::<data::CsvProvider>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
    }

    /// The fair-price seam takes only the last price and external inputs,
    /// never the series or the risk estimate.
    #[test]
    fn fair_price_model_sees_only_price_and_inputs() {
        fn _check_trait_object_builds(
            model: &dyn decision::FairPriceModel,
            inputs: &AssetInputs,
        ) -> Option<f64> {
            model.fair_price(100.0, inputs)
        }
    }
}
