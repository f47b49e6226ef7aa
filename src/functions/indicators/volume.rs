use crate::functions::{
    primitives::{closes, last_close, scaled_distance, std_dev, tail},
    traits::Indicator,
};
use crate::types::Bar;
use anyhow::{bail, Result};

// --- OBV ---
/// Net on-balance volume over the window divided by the window's total volume.
pub struct OBV {
    pub period: usize,
}

impl OBV {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for OBV {
    fn alias(&self) -> &str { "OBV" }
    fn ui_name(&self) -> &str { "On Balance Volume" }
    fn min_history(&self) -> usize { self.period + 1 }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = tail(history, self.period + 1)?;
        let (net, total) = window.windows(2).fold((0.0, 0.0), |(net, total), pair| {
            let direction = match pair[1].close.partial_cmp(&pair[0].close) {
                Some(std::cmp::Ordering::Greater) => 1.0,
                Some(std::cmp::Ordering::Less) => -1.0,
                _ => 0.0,
            };
            (net + direction * pair[1].volume, total + pair[1].volume)
        });
        if total <= 0.0 {
            return Ok(0.0);
        }
        Ok(net / total)
    }
}

// --- VWMA ---
/// Close relative to the volume-weighted moving average, in standard deviations.
pub struct VWMA {
    pub period: usize,
}

impl VWMA {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for VWMA {
    fn alias(&self) -> &str { "VWMA" }
    fn ui_name(&self) -> &str { "Volume Weighted Moving Average" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = tail(history, self.period)?;
        let volume: f64 = window.iter().map(|b| b.volume).sum();
        if volume <= 0.0 {
            bail!("VWMA: no volume in the last {} bars", self.period);
        }
        let vwma = window.iter().map(|b| b.close * b.volume).sum::<f64>() / volume;
        let scale = std_dev(&closes(window));
        Ok(scaled_distance(last_close(history)?, vwma, scale))
    }
}

// --- MFI ---
/// Money flow index mapped from [0, 100] to [-1, 1].
pub struct MFI {
    pub period: usize,
}

impl MFI {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for MFI {
    fn alias(&self) -> &str { "MFI" }
    fn ui_name(&self) -> &str { "Money Flow Index" }
    fn min_history(&self) -> usize { self.period + 1 }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = tail(history, self.period + 1)?;
        let (positive, negative) = window.windows(2).fold((0.0, 0.0), |(pos, neg), pair| {
            let prev = pair[0].typical_price();
            let current = pair[1].typical_price();
            let flow = current * pair[1].volume;
            if current > prev {
                (pos + flow, neg)
            } else if current < prev {
                (pos, neg + flow)
            } else {
                (pos, neg)
            }
        });
        if positive + negative <= 0.0 {
            return Ok(0.0);
        }
        let mfi = 100.0 * positive / (positive + negative);
        Ok((mfi - 50.0) / 50.0)
    }
}

// --- CMF ---
/// Chaikin money flow in [-1, 1].
pub struct CMF {
    pub period: usize,
}

impl CMF {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for CMF {
    fn alias(&self) -> &str { "CMF" }
    fn ui_name(&self) -> &str { "Chaikin Money Flow" }
    fn min_history(&self) -> usize { self.period }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        let window = tail(history, self.period)?;
        let (flow, volume) = window.iter().fold((0.0, 0.0), |(flow, volume), b| {
            let range = b.high - b.low;
            let multiplier = if range > 0.0 {
                ((b.close - b.low) - (b.high - b.close)) / range
            } else {
                0.0
            };
            (flow + multiplier * b.volume, volume + b.volume)
        });
        if volume <= 0.0 {
            return Ok(0.0);
        }
        Ok(flow / volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obv_all_up_moves() {
        let history: Vec<Bar> = (0..6)
            .map(|i| {
                let c = 10.0 + i as f64;
                Bar::new(c, c, c, c, 100.0)
            })
            .collect();
        assert!((OBV::new(5).evaluate(&history).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vwma_without_volume_fails() {
        let history = vec![Bar::new(1.0, 1.0, 1.0, 1.0, 0.0); 10];
        assert!(VWMA::new(10).evaluate(&history).is_err());
    }

    #[test]
    fn test_cmf_closes_at_high() {
        let history = vec![Bar::new(1.0, 2.0, 1.0, 2.0, 50.0); 10];
        assert!((CMF::new(10).evaluate(&history).unwrap() - 1.0).abs() < 1e-12);
    }
}
