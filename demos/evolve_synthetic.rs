//! Evolves agents on a synthetic random-walk series.
//!
//! Run with `RUST_LOG=info cargo run --example evolve_synthetic`. Settings can
//! be overridden from the environment, e.g. `GENETRADER__GENETIC__GENERATIONS=30`.

use genetrader::{
    config::ConfigManager,
    data::{DataSplitter, MarketData, SimpleSplitter},
    engines::evaluation::StrategyEvaluator,
    engines::generation::{AgentBank, EvolutionEngine},
    functions::IndicatorRegistry,
};
use polars::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Normal;
use std::sync::Arc;

fn random_walk(bars: usize, seed: u64) -> anyhow::Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let step = Normal::new(0.0002, 0.01)?;

    let mut close = Vec::with_capacity(bars);
    let mut price = 100.0;
    for _ in 0..bars {
        price *= 1.0 + rng.sample(step);
        close.push(price);
    }
    let open: Vec<f64> = close.iter().map(|c| c * (1.0 - 0.001)).collect();
    let high: Vec<f64> = close.iter().map(|c| c * (1.0 + rng.gen_range(0.0..0.01))).collect();
    let low: Vec<f64> = close.iter().map(|c| c * (1.0 - rng.gen_range(0.0..0.01))).collect();
    let volume: Vec<f64> = (0..bars).map(|_| rng.gen_range(500.0..1_500.0)).collect();
    let timestamp: Vec<i64> = (0..bars as i64)
        .map(|i| 1_577_836_800_000 + i * 86_400_000)
        .collect();

    Ok(df! {
        "timestamp" => &timestamp,
        "open" => &open,
        "high" => &high,
        "low" => &low,
        "close" => &close,
        "volume" => &volume,
    }?)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    manager.load_layered("genetrader.toml")?;
    let config = manager.get()?;

    let data = random_walk(1_500, 7)?;
    let split = SimpleSplitter::new(config.backtesting.train_test_split).split(&data)?;

    let registry = Arc::new(IndicatorRegistry::new());
    let evaluator = StrategyEvaluator::from_split(&split, Arc::clone(&registry), &config)?;

    let mut engine = EvolutionEngine::from_registry(config.genetic.clone(), &registry, evaluator)?;
    if let Some(path) = &config.persistence.agent_bank_path {
        engine = engine.with_agent_bank(AgentBank::open(path)?);
    }

    let outcome = engine.evolve()?;
    let best = &outcome.best_agent;
    println!("Best fitness: {:.4}", best.fitness);
    for (id, weight) in best.indicators.iter().zip(&best.weights) {
        println!("  {:<8} {:+.4}", id, weight);
    }
    println!(
        "Train: {} trades, sharpe {:.2} | Test: {} trades, sharpe {:.2}",
        best.train_metrics.total_trades,
        best.train_metrics.sharpe_ratio,
        best.test_metrics.total_trades,
        best.test_metrics.sharpe_ratio
    );

    let market = MarketData::from_dataframe(&data)?;
    println!("Readings on the last bar:");
    for (id, reading) in best.signal_breakdown(market.bars(), &registry) {
        println!("  {:<8} {:?}", id, reading);
    }
    Ok(())
}
