//! Fair-price valuation seam.
//!
//! The engine only needs an upper valuation bound; how it is derived is
//! pluggable. The bundled model prices an asset at the level where its
//! dividend yield would equal a target yield.

use super::AssetInputs;

/// Produces a fair-price ceiling for an asset, or `None` when it has no opinion.
pub trait FairPriceModel: Send + Sync {
    fn name(&self) -> &str;

    fn fair_price(&self, last_price: f64, inputs: &AssetInputs) -> Option<f64>;
}

/// No valuation bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFairPrice;

impl FairPriceModel for NoFairPrice {
    fn name(&self) -> &str {
        "none"
    }

    fn fair_price(&self, _last_price: f64, _inputs: &AssetInputs) -> Option<f64> {
        None
    }
}

/// fair = last_price * dividend_yield / target_yield
///
/// An asset yielding exactly `target_yield` is fairly priced; one yielding
/// more is cheap. Assets without a dividend get no bound.
#[derive(Debug, Clone, Copy)]
pub struct DividendYieldModel {
    target_yield: f64,
}

impl DividendYieldModel {
    pub fn new(target_yield: f64) -> Self {
        Self { target_yield }
    }

    pub fn target_yield(&self) -> f64 {
        self.target_yield
    }
}

impl FairPriceModel for DividendYieldModel {
    fn name(&self) -> &str {
        "dividend_yield"
    }

    fn fair_price(&self, last_price: f64, inputs: &AssetInputs) -> Option<f64> {
        let dividend_yield = inputs.dividend_yield;
        if !(self.target_yield > 0.0 && dividend_yield > 0.0 && last_price > 0.0) {
            return None;
        }
        let fair = last_price * dividend_yield / self.target_yield;
        fair.is_finite().then_some(fair)
    }
}
