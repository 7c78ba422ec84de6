//! Criterion benchmarks for the advisor hot paths.
//!
//! 1. Monte-Carlo bust/goal estimate at several simulation counts
//! 2. Indicator frame over a year of bars
//! 3. Full single-asset evaluation

use advisor_core::decision::{AssetInputs, DecisionEngine};
use advisor_core::domain::{PriceBar, PriceSeries};
use advisor_core::indicators::IndicatorFrame;
use advisor_core::montecarlo::MonteCarloRiskSimulator;
use advisor_core::{EngineConfig, RngHierarchy};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn make_series(n: usize) -> PriceSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.05;
            PriceBar {
                date: base + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000,
            }
        })
        .collect();
    match PriceSeries::new("BENCH", bars) {
        Ok(series) => series,
        Err(e) => panic!("bench series invalid: {e}"),
    }
}

fn bench_simulator(c: &mut Criterion) {
    let closes = make_series(250).closes();
    let rngs = RngHierarchy::new(42);
    let mut group = c.benchmark_group("montecarlo");
    for sims in [1_000usize, 10_000] {
        let sim = MonteCarloRiskSimulator::new(sims).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(sims), &sims, |b, _| {
            b.iter(|| {
                let mut rng = rngs.rng_for("BENCH", 0);
                black_box(sim.estimate(black_box(&closes), 0.1, 0.1, &mut rng).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_indicators(c: &mut Criterion) {
    let series = make_series(250);
    let config = EngineConfig::default();
    c.bench_function("indicator_frame_250", |b| {
        b.iter(|| black_box(IndicatorFrame::compute(black_box(&series), &config)))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let series = make_series(250);
    let engine = DecisionEngine::new(EngineConfig::default()).unwrap();
    let rngs = RngHierarchy::new(7);
    c.bench_function("evaluate_250", |b| {
        b.iter(|| {
            let mut rng = rngs.rng_for("BENCH", 0);
            black_box(engine.evaluate(&series, &AssetInputs::default(), &mut rng).unwrap())
        })
    });
}

criterion_group!(benches, bench_simulator, bench_indicators, bench_evaluate);
criterion_main!(benches);
