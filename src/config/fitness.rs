use super::traits::{check_positive, ConfigSection};
use crate::engines::metrics::FitnessWeights;
use crate::error::GenetraderError;
use crate::types::FitnessMetrics;
use serde::{Deserialize, Serialize};

/// Thresholds an agent's out-of-sample metrics must meet to be considered tradable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessCriteria {
    pub min_profit_factor: f64,
    pub min_trades: usize,
    pub max_drawdown: f64,
    pub min_sharpe: f64,
}

impl Default for FitnessCriteria {
    fn default() -> Self {
        Self {
            min_profit_factor: 1.0,
            min_trades: 100,
            max_drawdown: 0.10,
            min_sharpe: 0.98,
        }
    }
}

impl FitnessCriteria {
    pub fn accepts(&self, metrics: &FitnessMetrics) -> bool {
        metrics.profit_factor >= self.min_profit_factor
            && metrics.total_trades >= self.min_trades
            && metrics.max_drawdown <= self.max_drawdown
            && metrics.sharpe_ratio >= self.min_sharpe
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub weights: FitnessWeights,
    pub criteria: FitnessCriteria,
}

impl ConfigSection for FitnessConfig {
    fn section_name() -> &'static str {
        "fitness"
    }

    fn validate(&self) -> Result<(), GenetraderError> {
        let w = &self.weights;
        for (name, value) in [
            ("profit_factor", w.profit_factor),
            ("sharpe_ratio", w.sharpe_ratio),
            ("win_rate", w.win_rate),
            ("max_drawdown", w.max_drawdown),
            ("expectancy", w.expectancy),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(GenetraderError::Configuration(format!(
                    "fitness weight {} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if w.total() <= 0.0 {
            return Err(GenetraderError::Configuration(
                "at least one fitness weight must be positive".to_string(),
            ));
        }
        check_positive("criteria.max_drawdown", self.criteria.max_drawdown)
    }
}
