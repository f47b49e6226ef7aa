use super::traits::{check_positive, ConfigSection};
use crate::error::GenetraderError;
use serde::{Deserialize, Serialize};

/// Position sizing and fixed-percentage exit levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeManagementConfig {
    pub risk_per_trade: f64,
    pub max_position_size: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for TradeManagementConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: 0.02,
            max_position_size: 0.1,
            stop_loss_pct: 0.02,
            take_profit_pct: 0.04,
        }
    }
}

impl TradeManagementConfig {
    /// Unsigned position size for the given capital.
    pub fn position_size(&self, capital: f64) -> f64 {
        let risk_amount = capital * self.risk_per_trade;
        let max_size = capital * self.max_position_size;
        (risk_amount / self.stop_loss_pct).min(max_size)
    }
}

impl ConfigSection for TradeManagementConfig {
    fn section_name() -> &'static str {
        "trade_management"
    }

    fn validate(&self) -> Result<(), GenetraderError> {
        check_positive("risk_per_trade", self.risk_per_trade)?;
        check_positive("max_position_size", self.max_position_size)?;
        check_positive("stop_loss_pct", self.stop_loss_pct)?;
        check_positive("take_profit_pct", self.take_profit_pct)?;
        if self.stop_loss_pct >= 1.0 {
            return Err(GenetraderError::Configuration(
                "stop_loss_pct must be below 1".to_string(),
            ));
        }
        Ok(())
    }
}
