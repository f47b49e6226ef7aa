use crate::types::Bar;
use anyhow::Result;

/// Pure function of the bar history up to and including the current bar.
///
/// Implementations read only a trailing window and must not panic on short
/// history; anything that goes wrong is reported through `Err`.
pub trait Indicator: Send + Sync {
    /// Identifier used in agent genomes
    fn alias(&self) -> &str;

    /// Display name
    fn ui_name(&self) -> &str;

    /// Bars required before `evaluate` yields a meaningful value
    fn min_history(&self) -> usize;

    fn evaluate(&self, history: &[Bar]) -> Result<f64>;
}

/// Outcome of reading one indicator on one history prefix.
///
/// Only `Value` contributes to an agent's signal; every other outcome is a
/// neutral 0.0 and never aborts evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorReading {
    Value(f64),
    InsufficientHistory { required: usize, available: usize },
    Unknown(String),
    Failed(String),
}

impl IndicatorReading {
    pub fn contribution(&self) -> f64 {
        match self {
            IndicatorReading::Value(v) => *v,
            _ => 0.0,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, IndicatorReading::Value(_))
    }
}

pub fn read_indicator(indicator: &dyn Indicator, history: &[Bar]) -> IndicatorReading {
    let required = indicator.min_history();
    if history.len() < required {
        return IndicatorReading::InsufficientHistory {
            required,
            available: history.len(),
        };
    }

    match indicator.evaluate(history) {
        Ok(value) if value.is_finite() => IndicatorReading::Value(value),
        Ok(value) => {
            log::debug!("{} produced non-finite value {}", indicator.alias(), value);
            IndicatorReading::Failed(format!("non-finite value {}", value))
        }
        Err(e) => {
            log::debug!("{} failed: {}", indicator.alias(), e);
            IndicatorReading::Failed(e.to_string())
        }
    }
}

/// Adapts a closure to the indicator contract.
pub struct FnIndicator<F> {
    alias: String,
    min_history: usize,
    func: F,
}

impl<F> FnIndicator<F>
where
    F: Fn(&[Bar]) -> Result<f64> + Send + Sync,
{
    pub fn new(alias: impl Into<String>, min_history: usize, func: F) -> Self {
        Self {
            alias: alias.into(),
            min_history,
            func,
        }
    }
}

impl<F> Indicator for FnIndicator<F>
where
    F: Fn(&[Bar]) -> Result<f64> + Send + Sync,
{
    fn alias(&self) -> &str {
        &self.alias
    }

    fn ui_name(&self) -> &str {
        &self.alias
    }

    fn min_history(&self) -> usize {
        self.min_history
    }

    fn evaluate(&self, history: &[Bar]) -> Result<f64> {
        (self.func)(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn bars(n: usize) -> Vec<Bar> {
        (0..n).map(|i| Bar::new(1.0, 1.0, 1.0, 1.0 + i as f64, 0.0)).collect()
    }

    #[test]
    fn test_short_history_is_distinct_from_failure() {
        let needs_five = FnIndicator::new("FIVE", 5, |_: &[Bar]| Ok(1.0));
        assert_eq!(
            read_indicator(&needs_five, &bars(3)),
            IndicatorReading::InsufficientHistory { required: 5, available: 3 }
        );
        assert_eq!(read_indicator(&needs_five, &bars(5)), IndicatorReading::Value(1.0));

        let broken = FnIndicator::new("BROKEN", 0, |_: &[Bar]| -> Result<f64> { bail!("boom") });
        assert_eq!(
            read_indicator(&broken, &bars(3)),
            IndicatorReading::Failed("boom".to_string())
        );
    }

    #[test]
    fn test_non_finite_values_are_failures() {
        let nan = FnIndicator::new("NAN", 0, |_: &[Bar]| Ok(f64::NAN));
        let reading = read_indicator(&nan, &bars(2));
        assert!(matches!(reading, IndicatorReading::Failed(_)));
        assert_eq!(reading.contribution(), 0.0);
    }
}
