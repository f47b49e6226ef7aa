//! Scalar fitness derived from backtest metrics.

use crate::types::FitnessMetrics;
use serde::{Deserialize, Serialize};

/// Weights of the normalized metric components. The defaults sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub profit_factor: f64,
    pub sharpe_ratio: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub expectancy: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            profit_factor: 0.3,
            sharpe_ratio: 0.2,
            win_rate: 0.15,
            max_drawdown: 0.15,
            expectancy: 0.2,
        }
    }
}

impl FitnessWeights {
    pub fn total(&self) -> f64 {
        self.profit_factor + self.sharpe_ratio + self.win_rate + self.max_drawdown + self.expectancy
    }
}

/// Weighted sum of the normalized components of one split's metrics.
pub fn weighted_fitness(metrics: &FitnessMetrics, weights: &FitnessWeights) -> f64 {
    let profit_factor = (metrics.profit_factor / 3.0).min(1.0);
    let sharpe = (metrics.sharpe_ratio / 2.0).clamp(0.0, 1.0);
    let drawdown = 1.0 - (metrics.max_drawdown / 0.2).min(1.0);
    let expectancy = (metrics.expectancy / 0.02).min(1.0);

    weights.profit_factor * profit_factor
        + weights.sharpe_ratio * sharpe
        + weights.win_rate * metrics.win_rate
        + weights.max_drawdown * drawdown
        + weights.expectancy * expectancy
}

/// Penalizes the gap between in-sample and out-of-sample fitness.
pub fn combined_fitness(train: f64, test: f64) -> f64 {
    train.min(test) - 0.5 * (train - test).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics_score_drawdown_only() {
        let fitness = weighted_fitness(&FitnessMetrics::empty(), &FitnessWeights::default());
        assert!((fitness - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_capped_components() {
        let metrics = FitnessMetrics {
            profit_factor: 10.0,
            sharpe_ratio: 5.0,
            win_rate: 1.0,
            max_drawdown: 0.0,
            expectancy: 500.0,
            total_trades: 10,
            ..FitnessMetrics::empty()
        };
        let fitness = weighted_fitness(&metrics, &FitnessWeights::default());
        assert!((fitness - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_overfitting_penalty() {
        assert!((combined_fitness(0.8, 0.6) - 0.5).abs() < 1e-12);
        assert!((combined_fitness(0.6, 0.8) - 0.5).abs() < 1e-12);
        assert_eq!(combined_fitness(0.4, 0.4), 0.4);
        assert!(combined_fitness(0.9, 0.4) < combined_fitness(0.4, 0.4));
        assert!(combined_fitness(0.4, 0.9) < combined_fitness(0.9, 0.9));
    }
}
