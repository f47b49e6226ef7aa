// src/engines/metrics/profitability.rs
use crate::engines::metrics::EPSILON;
use crate::types::TradeResult;

pub struct ProfitabilityMetrics;

impl ProfitabilityMetrics {
    pub fn win_rate(trades: &[TradeResult]) -> f64 {
        if trades.is_empty() {
            return 0.0;
        }
        trades.iter().filter(|t| t.pnl > 0.0).count() as f64 / trades.len() as f64
    }

    /// Gross profit over gross loss.
    pub fn profit_factor(trades: &[TradeResult]) -> f64 {
        let (gross_profit, gross_loss) = Self::gross(trades);
        gross_profit / (gross_loss + EPSILON)
    }

    /// `avg_win * win_fraction - avg_loss * loss_fraction`; an empty side contributes 0.
    pub fn expectancy(trades: &[TradeResult]) -> f64 {
        if trades.is_empty() {
            return 0.0;
        }
        let total = trades.len() as f64;
        let wins = trades.iter().filter(|t| t.pnl > 0.0).count();
        let losses = trades.iter().filter(|t| t.pnl < 0.0).count();
        let (gross_profit, gross_loss) = Self::gross(trades);

        let win_side = if wins > 0 {
            gross_profit / wins as f64 * (wins as f64 / total)
        } else {
            0.0
        };
        let loss_side = if losses > 0 {
            gross_loss / losses as f64 * (losses as f64 / total)
        } else {
            0.0
        };
        win_side - loss_side
    }

    fn gross(trades: &[TradeResult]) -> (f64, f64) {
        trades.iter().fold((0.0, 0.0), |(profit, loss), t| {
            if t.pnl > 0.0 {
                (profit + t.pnl, loss)
            } else if t.pnl < 0.0 {
                (profit, loss + t.pnl.abs())
            } else {
                (profit, loss)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExitReason;

    fn trade(pnl: f64) -> TradeResult {
        TradeResult {
            entry_bar: 0,
            exit_bar: 1,
            entry_time: None,
            exit_time: None,
            entry_price: 100.0,
            exit_price: 100.0,
            position_size: 1.0,
            pnl,
            return_pct: pnl / 1000.0,
            drawdown: 0.0,
            duration: 1,
            max_adverse_excursion: 0.0,
            max_favorable_excursion: 0.0,
            entry_reason: "Signal Entry".to_string(),
            exit_reason: ExitReason::Signal,
        }
    }

    #[test]
    fn test_profitability_of_mixed_trades() {
        let trades = vec![trade(30.0), trade(-10.0), trade(0.0), trade(10.0)];
        assert_eq!(ProfitabilityMetrics::win_rate(&trades), 0.5);
        assert!((ProfitabilityMetrics::profit_factor(&trades) - 4.0).abs() < 1e-6);
        assert!((ProfitabilityMetrics::expectancy(&trades) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_expectancy_without_losses() {
        let trades = vec![trade(10.0), trade(20.0)];
        assert!((ProfitabilityMetrics::expectancy(&trades) - 15.0).abs() < 1e-12);
        assert_eq!(ProfitabilityMetrics::expectancy(&[]), 0.0);
    }
}
