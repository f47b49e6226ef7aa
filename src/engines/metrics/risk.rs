// src/engines/metrics/risk.rs
use crate::engines::metrics::EPSILON;
use crate::functions::primitives::{mean, sample_std_dev};

/// Trading days per year used to annualize per-trade ratios.
pub const PERIODS_PER_YEAR: f64 = 252.0;

pub struct RiskMetrics;

impl RiskMetrics {
    /// Annualized Sharpe ratio of per-trade returns; 0.0 below two trades.
    pub fn sharpe_ratio(returns: &[f64]) -> f64 {
        if returns.len() < 2 {
            return 0.0;
        }
        PERIODS_PER_YEAR.sqrt() * mean(returns) / (sample_std_dev(returns) + EPSILON)
    }

    /// Annualized Sortino ratio. 0.0 below two trades or without losing returns.
    pub fn sortino_ratio(returns: &[f64]) -> f64 {
        if returns.len() < 2 {
            return 0.0;
        }
        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        if downside.is_empty() {
            return 0.0;
        }
        PERIODS_PER_YEAR.sqrt() * mean(returns) / (sample_std_dev(&downside) + EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios_need_two_trades() {
        assert_eq!(RiskMetrics::sharpe_ratio(&[0.05]), 0.0);
        assert_eq!(RiskMetrics::sortino_ratio(&[-0.05]), 0.0);
    }

    #[test]
    fn test_sortino_without_losses_is_zero() {
        assert_eq!(RiskMetrics::sortino_ratio(&[0.01, 0.02, 0.03]), 0.0);
        assert!(RiskMetrics::sharpe_ratio(&[0.01, 0.02, 0.03]) > 0.0);
    }

    #[test]
    fn test_single_loss_has_zero_downside_deviation() {
        let sortino = RiskMetrics::sortino_ratio(&[0.02, -0.01]);
        let expected = PERIODS_PER_YEAR.sqrt() * 0.005 / EPSILON;
        assert!((sortino - expected).abs() / expected < 1e-9);
    }
}
