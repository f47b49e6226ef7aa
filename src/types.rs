use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: Option<DateTime<Utc>>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp: None,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn from_signal(signal: f64) -> Self {
        if signal >= 0.0 {
            Direction::Long
        } else {
            Direction::Short
        }
    }

    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Signal,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "Stop Loss",
            ExitReason::TakeProfit => "Take Profit",
            ExitReason::Signal => "Signal Exit",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ENTRY_REASON_SIGNAL: &str = "Signal Entry";

/// Closed trade record. `position_size` is signed: negative for shorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub entry_bar: usize,
    pub exit_bar: usize,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub position_size: f64,
    pub pnl: f64,
    pub return_pct: f64,
    pub drawdown: f64,
    /// Holding period in bars
    pub duration: usize,
    pub max_adverse_excursion: f64,
    pub max_favorable_excursion: f64,
    pub entry_reason: String,
    pub exit_reason: ExitReason,
}

impl TradeResult {
    pub fn direction(&self) -> Direction {
        Direction::from_signal(self.position_size)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

/// Performance statistics of one backtest run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessMetrics {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_trades: usize,
    pub avg_trade_duration: f64,
    pub avg_mae: f64,
    pub avg_mfe: f64,
    pub expectancy: f64,
}

impl FitnessMetrics {
    pub const NAMES: [&'static str; 11] = [
        "total_return",
        "sharpe_ratio",
        "sortino_ratio",
        "max_drawdown",
        "win_rate",
        "profit_factor",
        "total_trades",
        "avg_trade_duration",
        "avg_mae",
        "avg_mfe",
        "expectancy",
    ];

    /// Record returned for runs that closed no trades.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "total_return" => self.total_return,
            "sharpe_ratio" => self.sharpe_ratio,
            "sortino_ratio" => self.sortino_ratio,
            "max_drawdown" => self.max_drawdown,
            "win_rate" => self.win_rate,
            "profit_factor" => self.profit_factor,
            "total_trades" => self.total_trades as f64,
            "avg_trade_duration" => self.avg_trade_duration,
            "avg_mae" => self.avg_mae,
            "avg_mfe" => self.avg_mfe,
            "expectancy" => self.expectancy,
            _ => return None,
        };
        Some(value)
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|v| (name.to_string(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_map_has_every_name() {
        let metrics = FitnessMetrics {
            total_trades: 3,
            win_rate: 0.5,
            ..FitnessMetrics::empty()
        };
        let map = metrics.to_map();
        assert_eq!(map.len(), FitnessMetrics::NAMES.len());
        assert_eq!(map["total_trades"], 3.0);
        assert_eq!(map["win_rate"], 0.5);
        assert!(metrics.get("unknown").is_none());
    }

    #[test]
    fn test_exit_reason_labels() {
        assert_eq!(ExitReason::StopLoss.to_string(), "Stop Loss");
        assert_eq!(ExitReason::TakeProfit.to_string(), "Take Profit");
        assert_eq!(ExitReason::Signal.to_string(), "Signal Exit");
    }
}
