//! IndicatorFrame: every derived column for one series, aligned by date.
//!
//! Recomputed from the series on each evaluation pass and never stored on its own.

use super::{anomaly_count, Atr, Channel, Ema, Indicator};
use crate::config::{ConfigError, EngineConfig};
use crate::domain::PriceSeries;
use crate::trend::{Trend, TrendCounts};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub period: usize,
    pub dates: Vec<NaiveDate>,
    pub atr: Vec<Option<f64>>,
    /// EMA(period), the channel midline.
    pub ema: Vec<Option<f64>>,
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub channel: Channel,
    pub trend: Trend,
    pub trend_counts: TrendCounts,
    pub anomalies: usize,
}

impl IndicatorFrame {
    /// Fails only when `config` does not validate.
    pub fn compute(series: &PriceSeries, config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bars = series.bars();
        let closes = series.closes();

        let atr = Atr::new(config.period).compute(bars);
        let ema = Ema::new(config.period).compute(bars);
        let ema_fast = Ema::new(config.fast_ema_period).compute(bars);
        let ema_slow = Ema::new(config.slow_ema_period).compute(bars);

        let channel = Channel::compute(&ema, &atr, config.channel_multiplier);
        let trend_counts = TrendCounts::tally(&ema_fast, &ema_slow);
        let anomalies = anomaly_count(&closes, &ema, &atr, config.anomaly_ratio);

        Ok(Self {
            period: config.period,
            dates: series.dates(),
            trend: trend_counts.classify(config.trend_threshold),
            trend_counts,
            atr,
            ema,
            ema_fast,
            ema_slow,
            channel,
            anomalies,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// True once ATR and EMA exist on the last bar; the decision layer needs both.
    pub fn is_evaluable(&self) -> bool {
        self.last_atr().is_some() && self.last_ema().is_some()
    }

    pub fn last_atr(&self) -> Option<f64> {
        self.atr.last().copied().flatten()
    }

    pub fn last_ema(&self) -> Option<f64> {
        self.ema.last().copied().flatten()
    }

    /// Index of the first bar carrying an ATR value.
    pub fn first_available(&self) -> Option<usize> {
        self.atr.iter().position(Option::is_some)
    }

    pub fn has_anomaly(&self) -> bool {
        self.anomalies > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new("TEST", make_bars(closes)).unwrap()
    }

    #[test]
    fn short_series_is_entirely_unavailable() {
        let frame = IndicatorFrame::compute(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), &EngineConfig::default()).unwrap();
        assert_eq!(frame.len(), 5);
        assert!(frame.atr.iter().all(Option::is_none));
        assert!(frame.ema.iter().all(Option::is_none));
        assert!(!frame.is_evaluable());
        assert_eq!(frame.anomalies, 0);
    }

    #[test]
    fn first_value_lands_on_bar_period_plus_one() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let frame = IndicatorFrame::compute(&series(&closes), &EngineConfig::default()).unwrap();
        assert_eq!(frame.first_available(), Some(5));
        assert!(frame.ema[4].is_none());
        assert!(frame.ema[5].is_some());
        assert!(frame.ema_slow[19].is_none());
        assert!(frame.ema_slow[20].is_some());
        assert!(frame.is_evaluable());
    }

    #[test]
    fn rising_series_trends_up() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 2.0 * i as f64).collect();
        let frame = IndicatorFrame::compute(&series(&closes), &EngineConfig::default()).unwrap();
        assert_eq!(frame.trend, Trend::Up);
    }

    #[test]
    fn channel_wraps_ema() {
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + (i % 3) as f64).collect();
        let frame = IndicatorFrame::compute(&series(&closes), &EngineConfig::default()).unwrap();
        let (lo, hi) = frame.channel.last().unwrap();
        let mid = frame.last_ema().unwrap();
        let atr = frame.last_atr().unwrap();
        assert_approx(hi - mid, 2.0 * atr, DEFAULT_EPSILON);
        assert_approx(mid - lo, 2.0 * atr, DEFAULT_EPSILON);
    }

    #[test]
    fn spike_is_an_anomaly() {
        let mut closes = vec![100.0; 20];
        closes[15] = 140.0;
        let frame = IndicatorFrame::compute(&series(&closes), &EngineConfig::default()).unwrap();
        assert!(frame.has_anomaly());
    }

    #[test]
    fn zero_period_is_a_config_error() {
        let config = EngineConfig {
            period: 0,
            ..EngineConfig::default()
        };
        let err = IndicatorFrame::compute(&series(&[1.0, 2.0, 3.0]), &config).unwrap_err();
        assert_eq!(err, ConfigError::NotPositive { field: "period" });
    }
}
