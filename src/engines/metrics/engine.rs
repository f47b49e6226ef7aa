// src/engines/metrics/engine.rs
use crate::engines::metrics::{ProfitabilityMetrics, RiskMetrics};
use crate::functions::primitives::mean;
use crate::types::{FitnessMetrics, TradeResult};

pub struct MetricsEngine;

impl MetricsEngine {
    /// Summarizes one backtest run. A run without closed trades yields the empty record.
    pub fn calculate(
        trades: &[TradeResult],
        initial_capital: f64,
        final_capital: f64,
        max_drawdown: f64,
    ) -> FitnessMetrics {
        if trades.is_empty() {
            return FitnessMetrics::empty();
        }

        let returns: Vec<f64> = trades.iter().map(|t| t.return_pct).collect();
        let durations: Vec<f64> = trades.iter().map(|t| t.duration as f64).collect();
        let mae: Vec<f64> = trades.iter().map(|t| t.max_adverse_excursion).collect();
        let mfe: Vec<f64> = trades.iter().map(|t| t.max_favorable_excursion).collect();

        FitnessMetrics {
            total_return: (final_capital - initial_capital) / initial_capital,
            sharpe_ratio: RiskMetrics::sharpe_ratio(&returns),
            sortino_ratio: RiskMetrics::sortino_ratio(&returns),
            max_drawdown,
            win_rate: ProfitabilityMetrics::win_rate(trades),
            profit_factor: ProfitabilityMetrics::profit_factor(trades),
            total_trades: trades.len(),
            avg_trade_duration: mean(&durations),
            avg_mae: mean(&mae),
            avg_mfe: mean(&mfe),
            expectancy: ProfitabilityMetrics::expectancy(trades),
        }
    }
}
