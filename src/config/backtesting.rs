use super::traits::{check_positive, ConfigSection};
use crate::error::GenetraderError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestingConfig {
    pub initial_capital: f64,
    /// Fraction of a single table used for training by `SimpleSplitter`.
    pub train_test_split: f64,
    /// Processing units left free when sizing the evaluation pool.
    pub reserved_threads: usize,
}

impl Default for BacktestingConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            train_test_split: 0.8,
            reserved_threads: 2,
        }
    }
}

impl ConfigSection for BacktestingConfig {
    fn section_name() -> &'static str {
        "backtesting"
    }

    fn validate(&self) -> Result<(), GenetraderError> {
        if self.train_test_split <= 0.0 || self.train_test_split >= 1.0 {
            return Err(GenetraderError::Configuration(
                "Train/test split must be between 0 and 1".to_string(),
            ));
        }
        check_positive("initial_capital", self.initial_capital)
    }
}
