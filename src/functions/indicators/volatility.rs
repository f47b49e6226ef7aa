use crate::functions::{
    primitives::{average_true_range, closes, ema_series, high_low, last_close, mean, scaled_distance, std_dev, tail},
    traits::Indicator,
};
use crate::types::Bar;
use anyhow::{bail, Result};

// --- ATR ---
/// Average true range as a percentage of the close.
pub struct ATR {
    pub period: usize,
}

impl ATR {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for ATR {
    fn alias(&self) -> &str { "ATR" }
    fn ui_name(&self) -> &str { "Average True Range" }
    fn min_history(&self) -> usize { self.period + 1 }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let close = last_close(history)?;
        if close <= 0.0 {
            bail!("ATR: close {} is not positive", close);
        }
        Ok(average_true_range(history, self.period)? / close * 100.0)
    }
}

// --- BBANDS ---
/// Position inside the Bollinger band: -1 at the lower band, +1 at the upper band.
pub struct BollingerBands {
    pub period: usize,
    pub deviations: f64,
}

impl BollingerBands {
    pub fn new(period: usize, deviations: f64) -> Self {
        Self { period, deviations }
    }
}

impl Indicator for BollingerBands {
    fn alias(&self) -> &str { "BBANDS" }
    fn ui_name(&self) -> &str { "Bollinger Bands" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = closes(tail(history, self.period)?);
        let width = self.deviations * std_dev(&window);
        Ok(scaled_distance(last_close(history)?, mean(&window), width))
    }
}

// --- DC ---
/// Position inside the Donchian channel in [-1, 1].
pub struct Donchian {
    pub period: usize,
}

impl Donchian {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Donchian {
    fn alias(&self) -> &str { "DC" }
    fn ui_name(&self) -> &str { "Donchian Channel" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let (hh, ll) = high_low(tail(history, self.period)?);
        if hh - ll <= f64::EPSILON {
            return Ok(0.0);
        }
        Ok((last_close(history)? - ll) / (hh - ll) * 2.0 - 1.0)
    }
}

// --- KC ---
/// Distance from the Keltner midline in units of `multiplier` ATRs.
pub struct Keltner {
    pub period: usize,
    pub multiplier: f64,
}

impl Keltner {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self { period, multiplier }
    }
}

impl Indicator for Keltner {
    fn alias(&self) -> &str { "KC" }
    fn ui_name(&self) -> &str { "Keltner Channel" }
    fn min_history(&self) -> usize { self.period + 1 }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let lookback = (self.period * 4).min(history.len());
        let values = closes(&history[history.len() - lookback..]);
        let midline = ema_series(&values, self.period).last().copied().unwrap_or(0.0);
        let atr = average_true_range(history, self.period)?;
        Ok(scaled_distance(last_close(history)?, midline, self.multiplier * atr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atr_of_constant_range() {
        let history: Vec<Bar> = (0..6).map(|_| Bar::new(100.0, 101.0, 99.0, 100.0, 0.0)).collect();
        let atr = ATR::new(5).evaluate(&history).unwrap();
        assert!((atr - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_donchian_top_of_channel() {
        let history: Vec<Bar> = (0..5)
            .map(|i| {
                let c = 10.0 + i as f64;
                Bar::new(c, c, c - 1.0, c, 0.0)
            })
            .collect();
        assert!((Donchian::new(5).evaluate(&history).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bollinger_flat_series_is_neutral() {
        let history = vec![Bar::new(5.0, 5.0, 5.0, 5.0, 0.0); 20];
        assert_eq!(BollingerBands::new(20, 2.0).evaluate(&history).unwrap(), 0.0);
    }
}
