//! Decision engine: turns indicators and simulated risk into a call.
//!
//! One `evaluate` call walks a single asset through the state machine in
//! [`state`]. It is a pure function of the series, the per-asset inputs, the
//! engine configuration and the injected random source.

pub mod fair_price;
pub mod reward_risk;
pub mod state;

pub use fair_price::{DividendYieldModel, FairPriceModel, NoFairPrice};
pub use reward_risk::RewardRisk;
pub use state::{EvaluationState, ExclusionReason};

use crate::config::{ConfigError, EngineConfig};
use crate::domain::{Action, PriceSeries, Recommendation};
use crate::error::EngineError;
use crate::indicators::IndicatorFrame;
use crate::montecarlo::{MonteCarloRiskSimulator, RiskEstimate};
use crate::trend::Trend;
use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// External per-asset inputs: a recorded entry, a price ceiling and a dividend yield.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetInputs {
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub limit: Option<f64>,
    /// Annual dividend yield as a fraction (0.05 = 5%).
    #[serde(default)]
    pub dividend_yield: f64,
}

impl AssetInputs {
    /// Zero or non-finite entry/limit values mean "not set".
    pub fn new(entry_price: f64, limit: f64, dividend_yield: f64) -> Self {
        let present = |v: f64| (v.is_finite() && v > 0.0).then_some(v);
        Self {
            entry_price: present(entry_price),
            limit: present(limit),
            dividend_yield: if dividend_yield.is_finite() { dividend_yield } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopLoss {
    pub price: f64,
    /// 1 - price / last_close; the simulator's bust threshold.
    pub pct: f64,
    /// True when the ATR stop was unusable and the fallback fraction applied.
    pub fallback: bool,
}

/// last_close - atr_multiplier * ATR, or `stop_loss_fallback * last_close` when
/// that is not strictly between zero and the last close.
pub fn stop_loss(last_close: f64, atr: f64, config: &EngineConfig) -> StopLoss {
    let candidate = last_close - config.atr_multiplier * atr;
    let usable = candidate.is_finite() && candidate > 0.0 && candidate < last_close;
    let price = if usable {
        candidate
    } else {
        last_close * config.stop_loss_fallback
    };
    StopLoss {
        price,
        pct: 1.0 - price / last_close,
        fallback: !usable,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SellSignal {
    pub entry_price: f64,
    /// Realized gain in percent.
    pub gain_pct: f64,
}

/// Fires when the last close is more than `min_goal` above a recorded entry.
pub fn sell_signal(last_close: f64, entry_price: Option<f64>, min_goal: f64) -> Option<SellSignal> {
    let entry = entry_price.filter(|e| *e > 0.0)?;
    if last_close <= entry {
        return None;
    }
    let gain_pct = (last_close / entry - 1.0) * 100.0;
    (gain_pct > min_goal * 100.0).then_some(SellSignal {
        entry_price: entry,
        gain_pct,
    })
}

/// Price bound a buy must respect, when the price is above every bound that is set.
fn breached_bound(last_close: f64, limit: Option<f64>, fair_price: Option<f64>) -> Option<f64> {
    let bounds: Vec<f64> = [limit, fair_price].into_iter().flatten().collect();
    if bounds.is_empty() || bounds.iter().any(|b| last_close <= *b) {
        return None;
    }
    bounds.into_iter().reduce(f64::max)
}

/// Everything one evaluation pass produced for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub symbol: String,
    pub as_of: Option<NaiveDate>,
    pub last_close: Option<f64>,
    pub state: EvaluationState,
    /// States visited, starting at `Unevaluated`.
    pub trail: Vec<EvaluationState>,
    pub exclusion: Option<ExclusionReason>,
    pub indicators: Option<IndicatorFrame>,
    pub stop_loss: Option<StopLoss>,
    pub risk: Option<RiskEstimate>,
    pub reward_risk: Option<RewardRisk>,
    pub fair_price: Option<f64>,
    pub sell: Option<SellSignal>,
    /// At most one sell and one buy. Both are present when a held asset
    /// still qualifies as a buy.
    pub recommendations: Vec<Recommendation>,
}

impl Evaluation {
    fn start(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            as_of: None,
            last_close: None,
            state: EvaluationState::Unevaluated,
            trail: vec![EvaluationState::Unevaluated],
            exclusion: None,
            indicators: None,
            stop_loss: None,
            risk: None,
            reward_risk: None,
            fair_price: None,
            sell: None,
            recommendations: Vec::new(),
        }
    }

    /// An asset whose data never arrived.
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        Self::start(symbol).exclude(ExclusionReason::DataUnavailable {
            reason: reason.into(),
        })
    }

    fn advance(&mut self, next: EvaluationState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        self.trail.push(next);
    }

    fn exclude(mut self, reason: ExclusionReason) -> Self {
        debug!(symbol = %self.symbol, from = %self.state, %reason, "asset excluded");
        self.advance(EvaluationState::Excluded);
        self.exclusion = Some(reason);
        self
    }

    pub fn recommendation(&self, action: Action) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.action == action)
    }

    /// Sell wins over buy; no recommendation means hold.
    pub fn action(&self) -> Action {
        [Action::Sell, Action::Buy]
            .into_iter()
            .find(|a| self.recommendation(*a).is_some())
            .unwrap_or(Action::Hold)
    }

    pub fn trend(&self) -> Option<Trend> {
        self.indicators.as_ref().map(|f| f.trend)
    }

    /// Visual anomaly flag: some close fell outside the anomaly band.
    pub fn has_anomaly(&self) -> bool {
        self.indicators.as_ref().is_some_and(IndicatorFrame::has_anomaly)
    }

    pub fn is_excluded(&self) -> bool {
        self.state == EvaluationState::Excluded
    }
}

/// Stateless apart from its read-only configuration; safe to share across threads.
pub struct DecisionEngine {
    config: EngineConfig,
    simulator: MonteCarloRiskSimulator,
    fair_price: Box<dyn FairPriceModel>,
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("config", &self.config)
            .field("simulator", &self.simulator)
            .field("fair_price", &self.fair_price.name())
            .finish()
    }
}

impl DecisionEngine {
    /// Validates `config`. A positive `fair_price_target_yield` selects the
    /// dividend-yield fair-price model.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let simulator = MonteCarloRiskSimulator::new(config.simulations)?;
        let fair_price: Box<dyn FairPriceModel> = if config.fair_price_target_yield > 0.0 {
            Box::new(DividendYieldModel::new(config.fair_price_target_yield))
        } else {
            Box::new(NoFairPrice)
        };
        Ok(Self {
            config,
            simulator,
            fair_price,
        })
    }

    pub fn with_fair_price_model(mut self, model: impl FairPriceModel + 'static) -> Self {
        self.fair_price = Box::new(model);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one asset.
    ///
    /// Short or unusable histories end in `Excluded` and are not errors.
    /// Errors are reserved for settings the simulator rejects.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        series: &PriceSeries,
        inputs: &AssetInputs,
        rng: &mut R,
    ) -> Result<Evaluation, EngineError> {
        let config = &self.config;
        let mut eval = Evaluation::start(series.symbol());

        let required = config.required_bars();
        let (Some(last), true) = (series.last(), series.len() >= required) else {
            return Ok(eval.exclude(ExclusionReason::InsufficientHistory {
                bars: series.len(),
                required,
            }));
        };
        let last_close = last.close;
        eval.as_of = Some(last.date);
        eval.last_close = Some(last_close);
        if !(last_close.is_finite() && last_close > 0.0) {
            return Ok(eval.exclude(ExclusionReason::InvalidLastPrice { price: last_close }));
        }
        eval.advance(EvaluationState::DataReady);

        let frame = IndicatorFrame::compute(series, config)?;
        let Some(atr) = frame.last_atr().filter(|_| frame.is_evaluable()) else {
            eval.indicators = Some(frame);
            let non_finite_bars = series.bars().iter().filter(|b| b.is_void()).count();
            return Ok(eval.exclude(ExclusionReason::IndicatorsUnavailable { non_finite_bars }));
        };
        eval.indicators = Some(frame);
        eval.advance(EvaluationState::IndicatorsComputed);

        let closes = series.closes();
        let stop = stop_loss(last_close, atr, config);
        let risk = self
            .simulator
            .estimate(&closes, stop.pct, config.min_goal, rng)?;
        eval.stop_loss = Some(stop);
        eval.risk = Some(risk);
        eval.advance(EvaluationState::RiskEstimated);

        eval.sell = sell_signal(last_close, inputs.entry_price, config.min_goal);

        let goal_odds_ok = risk.goal_probability > config.accepted_goal_chance;
        if goal_odds_ok {
            eval.reward_risk = reward_risk::sweep(config, &closes, stop.price, last_close, |_, goal| {
                self.simulator.estimate(&closes, stop.pct, goal, rng)
            })?;
        }
        let buy = goal_odds_ok
            && eval
                .reward_risk
                .is_some_and(|rr| rr.ratio >= config.min_reward_risk_ratio);

        eval.fair_price = self.fair_price.fair_price(last_close, inputs);

        debug!(
            symbol = %eval.symbol,
            last_close,
            stop = stop.price,
            bust_probability = risk.bust_probability,
            goal_probability = risk.goal_probability,
            reward_risk = ?eval.reward_risk.map(|rr| rr.ratio),
            buy,
            sell = eval.sell.is_some(),
            "risk gates evaluated"
        );

        let as_of = last.date;
        if let Some(sell) = eval.sell {
            eval.recommendations.push(Recommendation {
                symbol: eval.symbol.clone(),
                action: Action::Sell,
                entry_price: sell.entry_price,
                stop_loss: stop.price,
                exit_price: last_close,
                fair_price: eval.fair_price,
                reward_risk_ratio: eval.reward_risk.map(|rr| rr.ratio),
                bust_probability: risk.bust_probability,
                goal_probability: risk.goal_probability,
                gain_pct: Some(sell.gain_pct),
                as_of,
                timestamp: Utc::now(),
            });
        }

        if buy {
            let breached = breached_bound(last_close, inputs.limit, eval.fair_price);
            match (breached, eval.sell.is_some()) {
                (Some(bound), false) => {
                    return Ok(eval.exclude(ExclusionReason::AbovePriceLimit {
                        price: last_close,
                        limit: bound,
                    }));
                }
                (Some(bound), true) => {
                    debug!(symbol = %eval.symbol, bound, "buy above price limit, selling only");
                }
                (None, _) => eval.recommendations.push(Recommendation {
                    symbol: eval.symbol.clone(),
                    action: Action::Buy,
                    entry_price: last_close,
                    stop_loss: stop.price,
                    exit_price: last_close * (1.0 + config.min_goal),
                    fair_price: eval.fair_price,
                    reward_risk_ratio: eval.reward_risk.map(|rr| rr.ratio),
                    bust_probability: risk.bust_probability,
                    goal_probability: risk.goal_probability,
                    gain_pct: None,
                    as_of,
                    timestamp: Utc::now(),
                }),
            }
        }

        match eval.action() {
            Action::Sell => eval.advance(EvaluationState::SellCandidate),
            Action::Buy => eval.advance(EvaluationState::BuyCandidate),
            Action::Hold => eval.advance(EvaluationState::Hold),
        }
        Ok(eval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, make_ohlc_bars};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine() -> DecisionEngine {
        DecisionEngine::new(EngineConfig {
            simulations: 500,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    fn rising(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 * 1.01f64.powi(i as i32)).collect();
        PriceSeries::new("RISE", make_bars(&closes)).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn stop_loss_from_atr() {
        let stop = stop_loss(100.0, 2.0, &EngineConfig::default());
        assert!((stop.price - 90.0).abs() < 1e-12);
        assert!((stop.pct - 0.1).abs() < 1e-12);
        assert!(!stop.fallback);
    }

    #[test]
    fn stop_loss_falls_back_when_non_positive() {
        let stop = stop_loss(100.0, 25.0, &EngineConfig::default());
        assert!((stop.price - 50.0).abs() < 1e-12);
        assert!(stop.fallback);
    }

    #[test]
    fn stop_loss_falls_back_on_zero_atr() {
        let stop = stop_loss(100.0, 0.0, &EngineConfig::default());
        assert!((stop.price - 50.0).abs() < 1e-12);
        assert!((stop.pct - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sell_requires_gain_above_min_goal() {
        assert!(sell_signal(110.0, Some(100.0), 0.1).is_none());
        let s = sell_signal(125.0, Some(100.0), 0.1).unwrap();
        assert!((s.gain_pct - 25.0).abs() < 1e-9);
        assert!(sell_signal(125.0, None, 0.1).is_none());
    }

    #[test]
    fn zero_inputs_mean_unset() {
        let inputs = AssetInputs::new(0.0, 0.0, 0.03);
        assert_eq!(inputs.entry_price, None);
        assert_eq!(inputs.limit, None);
        assert!((inputs.dividend_yield - 0.03).abs() < 1e-12);
    }

    #[test]
    fn bound_only_breached_when_above_every_set_bound() {
        assert_eq!(breached_bound(100.0, None, None), None);
        assert_eq!(breached_bound(100.0, Some(90.0), None), Some(90.0));
        assert_eq!(breached_bound(100.0, Some(90.0), Some(120.0)), None);
        assert_eq!(breached_bound(100.0, Some(90.0), Some(95.0)), Some(95.0));
    }

    #[test]
    fn short_history_is_excluded() {
        let series = PriceSeries::new("SHORT", make_bars(&[1.0, 2.0, 3.0])).unwrap();
        let eval = engine()
            .evaluate(&series, &AssetInputs::default(), &mut rng())
            .unwrap();
        assert_eq!(eval.state, EvaluationState::Excluded);
        assert_eq!(
            eval.exclusion,
            Some(ExclusionReason::InsufficientHistory {
                bars: 3,
                required: 6
            })
        );
        assert!(eval.recommendations.is_empty());
    }

    #[test]
    fn flat_series_holds_with_fallback_stop() {
        let bars = make_ohlc_bars(&[(100.0, 100.0, 100.0, 100.0); 30]);
        let series = PriceSeries::new("FLAT", bars).unwrap();
        let eval = engine()
            .evaluate(&series, &AssetInputs::default(), &mut rng())
            .unwrap();

        let frame = eval.indicators.as_ref().unwrap();
        assert_eq!(frame.first_available(), Some(5));
        assert!(frame.atr[5..].iter().all(|v| *v == Some(0.0)));

        let stop = eval.stop_loss.unwrap();
        assert!((stop.price - 50.0).abs() < 1e-12);
        assert!(stop.fallback);

        let risk = eval.risk.unwrap();
        assert_eq!(risk.bust_probability, 0.0);
        assert_eq!(risk.goal_probability, 0.0);
        assert!(eval.reward_risk.is_none());

        assert_eq!(eval.state, EvaluationState::Hold);
        assert_eq!(eval.action(), Action::Hold);
        assert_eq!(
            eval.trail,
            vec![
                EvaluationState::Unevaluated,
                EvaluationState::DataReady,
                EvaluationState::IndicatorsComputed,
                EvaluationState::RiskEstimated,
                EvaluationState::Hold,
            ]
        );
    }

    #[test]
    fn steady_uptrend_is_a_buy() {
        let eval = engine()
            .evaluate(&rising(60), &AssetInputs::default(), &mut rng())
            .unwrap();
        assert_eq!(eval.state, EvaluationState::BuyCandidate);
        let rec = eval.recommendation(Action::Buy).unwrap();
        assert_eq!(eval.recommendations.len(), 1);
        assert!(rec.stop_loss < rec.entry_price);
        assert!(rec.exit_price > rec.entry_price);
        assert!(rec.reward_risk_ratio.unwrap() >= 10.0);
        assert_eq!(eval.trend(), Some(Trend::Up));
    }

    #[test]
    fn buy_above_limit_is_excluded() {
        let inputs = AssetInputs::new(0.0, 50.0, 0.0);
        let eval = engine().evaluate(&rising(60), &inputs, &mut rng()).unwrap();
        assert_eq!(eval.state, EvaluationState::Excluded);
        assert!(matches!(
            eval.exclusion,
            Some(ExclusionReason::AbovePriceLimit { limit, .. }) if limit == 50.0
        ));
        assert!(eval.recommendations.is_empty());
    }

    #[test]
    fn cheap_by_fair_price_overrides_limit() {
        let engine = engine().with_fair_price_model(DividendYieldModel::new(0.01));
        let inputs = AssetInputs::new(0.0, 50.0, 0.08);
        let eval = engine.evaluate(&rising(60), &inputs, &mut rng()).unwrap();
        assert_eq!(eval.state, EvaluationState::BuyCandidate);
        assert!(eval.fair_price.unwrap() > eval.last_close.unwrap());
    }

    #[test]
    fn gain_over_entry_is_a_sell() {
        let inputs = AssetInputs::new(100.0, 0.0, 0.0);
        let eval = engine().evaluate(&rising(60), &inputs, &mut rng()).unwrap();
        assert_eq!(eval.state, EvaluationState::SellCandidate);
        assert_eq!(eval.action(), Action::Sell);
        let rec = eval.recommendation(Action::Sell).unwrap();
        assert_eq!(rec.entry_price, 100.0);
        assert_eq!(rec.exit_price, eval.last_close.unwrap());
        assert!(rec.gain_pct.unwrap() > 10.0);
    }

    #[test]
    fn held_asset_that_qualifies_keeps_its_buy() {
        let series = rising(60);
        let plain = engine()
            .evaluate(&series, &AssetInputs::default(), &mut rng())
            .unwrap();
        let held = engine()
            .evaluate(&series, &AssetInputs::new(100.0, 0.0, 0.0), &mut rng())
            .unwrap();

        assert_eq!(held.state, EvaluationState::SellCandidate);
        assert_eq!(held.reward_risk, plain.reward_risk);
        let buy = held.recommendation(Action::Buy).unwrap();
        let plain_buy = plain.recommendation(Action::Buy).unwrap();
        assert_eq!(buy.entry_price, plain_buy.entry_price);
        assert_eq!(buy.exit_price, plain_buy.exit_price);
        assert!(held.recommendation(Action::Sell).is_some());
    }

    #[test]
    fn held_asset_above_limit_only_sells() {
        let inputs = AssetInputs::new(100.0, 50.0, 0.0);
        let eval = engine().evaluate(&rising(60), &inputs, &mut rng()).unwrap();
        assert_eq!(eval.state, EvaluationState::SellCandidate);
        assert!(eval.exclusion.is_none());
        assert!(eval.recommendation(Action::Buy).is_none());
        assert_eq!(eval.recommendations.len(), 1);
    }

    #[test]
    fn non_finite_bar_is_not_reported_as_short_history() {
        let mut bars = make_bars(&(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        bars[20].close = f64::NAN;
        let series = PriceSeries::new("GAP", bars).unwrap();
        let eval = engine()
            .evaluate(&series, &AssetInputs::default(), &mut rng())
            .unwrap();
        assert_eq!(eval.state, EvaluationState::Excluded);
        assert_eq!(
            eval.exclusion,
            Some(ExclusionReason::IndicatorsUnavailable { non_finite_bars: 1 })
        );
    }

    #[test]
    fn same_seed_same_evaluation() {
        let series = rising(40);
        let a = engine()
            .evaluate(&series, &AssetInputs::default(), &mut rng())
            .unwrap();
        let b = engine()
            .evaluate(&series, &AssetInputs::default(), &mut rng())
            .unwrap();
        assert_eq!(a.risk, b.risk);
        assert_eq!(a.reward_risk, b.reward_risk);
        assert_eq!(a.state, b.state);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = EngineConfig {
            min_goal: 0.0,
            ..EngineConfig::default()
        };
        assert!(DecisionEngine::new(config).is_err());
    }

    #[test]
    fn unavailable_data_is_an_exclusion() {
        let eval = Evaluation::unavailable("GONE", "HTTP 404");
        assert!(eval.is_excluded());
        assert_eq!(eval.trail.len(), 2);
    }
}
