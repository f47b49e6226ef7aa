use crate::functions::{
    primitives::{closes, ema_series, last_close, mean, scaled_distance, std_dev, tail, weighted_mean},
    traits::Indicator,
};
use crate::types::Bar;
use anyhow::Result;

/// Bars fed into exponential averages; older bars have negligible weight.
fn ema_lookback(history: &[Bar], period: usize) -> &[Bar] {
    let n = (period * 4).min(history.len());
    &history[history.len() - n..]
}

// --- SMA ---
/// Close relative to its simple moving average, in standard deviations.
pub struct SMA {
    pub period: usize,
}

impl SMA {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for SMA {
    fn alias(&self) -> &str { "SMA" }
    fn ui_name(&self) -> &str { "Simple Moving Average" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = closes(tail(history, self.period)?);
        let close = last_close(history)?;
        Ok(scaled_distance(close, mean(&window), std_dev(&window)))
    }
}

// --- EMA ---
pub struct EMA {
    pub period: usize,
}

impl EMA {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for EMA {
    fn alias(&self) -> &str { "EMA" }
    fn ui_name(&self) -> &str { "Exponential Moving Average" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let values = closes(ema_lookback(history, self.period));
        let ema = ema_series(&values, self.period).last().copied().unwrap_or(0.0);
        let scale = std_dev(&closes(tail(history, self.period)?));
        Ok(scaled_distance(last_close(history)?, ema, scale))
    }
}

// --- WMA ---
pub struct WMA {
    pub period: usize,
}

impl WMA {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for WMA {
    fn alias(&self) -> &str { "WMA" }
    fn ui_name(&self) -> &str { "Weighted Moving Average" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = closes(tail(history, self.period)?);
        Ok(scaled_distance(
            last_close(history)?,
            weighted_mean(&window),
            std_dev(&window),
        ))
    }
}

// --- DEMA ---
pub struct DEMA {
    pub period: usize,
}

impl DEMA {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for DEMA {
    fn alias(&self) -> &str { "DEMA" }
    fn ui_name(&self) -> &str { "Double Exponential Moving Average" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let values = closes(ema_lookback(history, self.period));
        let ema = ema_series(&values, self.period);
        let ema_of_ema = ema_series(&ema, self.period);
        let dema = match (ema.last(), ema_of_ema.last()) {
            (Some(e), Some(ee)) => 2.0 * e - ee,
            _ => return Ok(0.0),
        };
        let scale = std_dev(&closes(tail(history, self.period)?));
        Ok(scaled_distance(last_close(history)?, dema, scale))
    }
}

// --- MACD ---
/// Histogram (MACD line minus signal line) scaled by recent close volatility.
pub struct MACD {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl MACD {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Indicator for MACD {
    fn alias(&self) -> &str { "MACD" }
    fn ui_name(&self) -> &str { "Moving Average Convergence Divergence" }
    fn min_history(&self) -> usize { self.slow_period + self.signal_period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let values = closes(ema_lookback(history, self.slow_period + self.signal_period));
        let fast = ema_series(&values, self.fast_period);
        let slow = ema_series(&values, self.slow_period);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_series(&line, self.signal_period);

        let histogram = match (line.last(), signal.last()) {
            (Some(l), Some(s)) => l - s,
            _ => return Ok(0.0),
        };
        let scale = std_dev(&closes(tail(history, self.slow_period)?));
        Ok(scaled_distance(histogram, 0.0, scale))
    }
}
