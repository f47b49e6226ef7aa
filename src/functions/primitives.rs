//! Numeric building blocks shared by indicators and metrics.

use crate::types::Bar;
use anyhow::{bail, Result};

/// Trailing `n` bars, or an error when fewer are available.
pub fn tail(history: &[Bar], n: usize) -> Result<&[Bar]> {
    if n == 0 || history.len() < n {
        bail!("need {} bars, have {}", n, history.len());
    }
    Ok(&history[history.len() - n..])
}

pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn last_close(history: &[Bar]) -> Result<f64> {
    match history.last() {
        Some(bar) => Ok(bar.close),
        None => bail!("empty history"),
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sample standard deviation (divides by n - 1); 0.0 below two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Exponential moving average series seeded with the first value.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = match values.first() {
        Some(v) => *v,
        None => return out,
    };
    out.push(prev);
    for v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Linearly weighted mean, most recent value weighted heaviest.
pub fn weighted_mean(values: &[f64]) -> f64 {
    let denom = (values.len() * (values.len() + 1)) as f64 / 2.0;
    if denom == 0.0 {
        return 0.0;
    }
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v * (i + 1) as f64)
        .sum::<f64>()
        / denom
}

pub fn true_range(prev_close: f64, bar: &Bar) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

/// Mean true range over the last `period` bars (needs `period + 1` bars).
pub fn average_true_range(history: &[Bar], period: usize) -> Result<f64> {
    let window = tail(history, period + 1)?;
    let ranges: Vec<f64> = window
        .windows(2)
        .map(|pair| true_range(pair[0].close, &pair[1]))
        .collect();
    Ok(mean(&ranges))
}

/// Distance of `value` from `center` in units of `scale`; 0.0 when the scale vanishes.
pub fn scaled_distance(value: f64, center: f64, scale: f64) -> f64 {
    if scale <= f64::EPSILON {
        0.0
    } else {
        (value - center) / scale
    }
}

/// Highest high and lowest low of a window.
pub fn high_low(window: &[Bar]) -> (f64, f64) {
    window.iter().fold((f64::NEG_INFINITY, f64::INFINITY), |(hh, ll), b| {
        (hh.max(b.high), ll.min(b.low))
    })
}
