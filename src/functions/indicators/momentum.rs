use crate::functions::{
    primitives::{closes, high_low, last_close, mean, scaled_distance, std_dev, tail},
    traits::Indicator,
};
use crate::types::Bar;
use anyhow::{bail, Result};

// --- RSI ---
/// Relative strength index mapped from [0, 100] to [-1, 1].
pub struct RSI {
    pub period: usize,
}

impl RSI {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for RSI {
    fn alias(&self) -> &str { "RSI" }
    fn ui_name(&self) -> &str { "Relative Strength Index" }
    fn min_history(&self) -> usize { self.period + 1 }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = closes(tail(history, self.period + 1)?);
        let (mut gain, mut loss) = (0.0, 0.0);
        for pair in window.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                gain += delta;
            } else {
                loss -= delta;
            }
        }

        if gain == 0.0 && loss == 0.0 {
            return Ok(0.0);
        }
        if loss == 0.0 {
            return Ok(1.0);
        }
        let rs = gain / loss;
        let rsi = 100.0 - 100.0 / (1.0 + rs);
        Ok((rsi - 50.0) / 50.0)
    }
}

// --- MOM ---
/// Close change over `period` bars, in standard deviations of the window.
pub struct Momentum {
    pub period: usize,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Momentum {
    fn alias(&self) -> &str { "MOM" }
    fn ui_name(&self) -> &str { "Momentum" }
    fn min_history(&self) -> usize { self.period + 1 }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = closes(tail(history, self.period + 1)?);
        let change = window[window.len() - 1] - window[0];
        Ok(scaled_distance(change, 0.0, std_dev(&window)))
    }
}

// --- ROC ---
/// Percent change over `period` bars.
pub struct ROC {
    pub period: usize,
}

impl ROC {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for ROC {
    fn alias(&self) -> &str { "ROC" }
    fn ui_name(&self) -> &str { "Rate of Change" }
    fn min_history(&self) -> usize { self.period + 1 }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let reference = tail(history, self.period + 1)?[0].close;
        if reference <= 0.0 {
            bail!("ROC: reference close {} is not positive", reference);
        }
        Ok((last_close(history)? / reference - 1.0) * 100.0)
    }
}

// --- STOCH ---
/// Stochastic %K mapped from [0, 100] to [-1, 1].
pub struct Stochastic {
    pub period: usize,
}

impl Stochastic {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Stochastic {
    fn alias(&self) -> &str { "STOCH" }
    fn ui_name(&self) -> &str { "Stochastic Oscillator" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let (hh, ll) = high_low(tail(history, self.period)?);
        if hh - ll <= f64::EPSILON {
            return Ok(0.0);
        }
        let k = (last_close(history)? - ll) / (hh - ll) * 100.0;
        Ok((k - 50.0) / 50.0)
    }
}

// --- WillR ---
/// Williams %R mapped from [-100, 0] to [-1, 1].
pub struct WilliamsR {
    pub period: usize,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for WilliamsR {
    fn alias(&self) -> &str { "WillR" }
    fn ui_name(&self) -> &str { "Williams %R" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let (hh, ll) = high_low(tail(history, self.period)?);
        if hh - ll <= f64::EPSILON {
            return Ok(0.0);
        }
        let r = (hh - last_close(history)?) / (hh - ll) * -100.0;
        Ok((r + 50.0) / 50.0)
    }
}

// --- CCI ---
/// Commodity channel index divided by 100.
pub struct CCI {
    pub period: usize,
}

impl CCI {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for CCI {
    fn alias(&self) -> &str { "CCI" }
    fn ui_name(&self) -> &str { "Commodity Channel Index" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let typical: Vec<f64> = tail(history, self.period)?
            .iter()
            .map(Bar::typical_price)
            .collect();
        let sma = mean(&typical);
        let mean_deviation =
            typical.iter().map(|tp| (tp - sma).abs()).sum::<f64>() / typical.len() as f64;
        let current = typical[typical.len() - 1];
        Ok(scaled_distance(current, sma, 0.015 * mean_deviation) / 100.0)
    }
}

// --- CMO ---
/// Chande momentum oscillator in [-1, 1].
pub struct CMO {
    pub period: usize,
}

impl CMO {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for CMO {
    fn alias(&self) -> &str { "CMO" }
    fn ui_name(&self) -> &str { "Chande Momentum Oscillator" }
    fn min_history(&self) -> usize { self.period + 1 }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = closes(tail(history, self.period + 1)?);
        let (up, down) = window.windows(2).fold((0.0, 0.0), |(up, down), pair| {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                (up + delta, down)
            } else {
                (up, down - delta)
            }
        });
        if up + down == 0.0 {
            return Ok(0.0);
        }
        Ok((up - down) / (up + down))
    }
}
