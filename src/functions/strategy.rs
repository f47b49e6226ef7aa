use crate::functions::traits::{read_indicator, Indicator, IndicatorReading};
use crate::types::Bar;
use std::sync::Arc;

/// One weighted indicator of a resolved agent. `indicator` is `None` when the
/// identifier is not registered.
#[derive(Clone)]
pub struct Term {
    pub id: String,
    pub weight: f64,
    pub indicator: Option<Arc<dyn Indicator>>,
}

impl Term {
    pub fn read(&self, history: &[Bar]) -> IndicatorReading {
        match &self.indicator {
            Some(indicator) => read_indicator(indicator.as_ref(), history),
            None => IndicatorReading::Unknown(self.id.clone()),
        }
    }
}

/// An agent's weighted indicators looked up once per backtest run.
#[derive(Clone, Default)]
pub struct ResolvedStrategy {
    terms: Vec<Term>,
}

impl ResolvedStrategy {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Weighted sum of readings; anything but a value contributes 0.0.
    pub fn signal(&self, history: &[Bar]) -> f64 {
        self.terms
            .iter()
            .map(|term| term.weight * term.read(history).contribution())
            .sum()
    }

    pub fn readings(&self, history: &[Bar]) -> Vec<(String, IndicatorReading)> {
        self.terms
            .iter()
            .map(|term| (term.id.clone(), term.read(history)))
            .collect()
    }

    pub fn unknown_ids(&self) -> Vec<String> {
        self.terms
            .iter()
            .filter(|term| term.indicator.is_none())
            .map(|term| term.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{registry::IndicatorRegistry, traits::FnIndicator};
    use anyhow::bail;

    fn registry() -> IndicatorRegistry {
        let mut registry = IndicatorRegistry::empty();
        registry.register(Arc::new(FnIndicator::new("ONE", 0, |_: &[Bar]| Ok(1.0))));
        registry.register(Arc::new(FnIndicator::new("LATE", 10, |_: &[Bar]| Ok(5.0))));
        registry.register(Arc::new(FnIndicator::new("BAD", 0, |_: &[Bar]| -> anyhow::Result<f64> {
            bail!("bad input")
        })));
        registry
    }

    #[test]
    fn test_signal_ignores_non_values() {
        let ids: Vec<String> = ["ONE", "LATE", "BAD", "MISSING"].iter().map(|s| s.to_string()).collect();
        let strategy = registry().resolve(&ids, &[0.5, 1.0, 1.0, 1.0]);
        let history = vec![Bar::new(1.0, 1.0, 1.0, 1.0, 0.0); 3];

        assert_eq!(strategy.signal(&history), 0.5);
        assert_eq!(strategy.unknown_ids(), vec!["MISSING".to_string()]);

        let readings = strategy.readings(&history);
        assert_eq!(readings[0].1, IndicatorReading::Value(1.0));
        assert_eq!(
            readings[1].1,
            IndicatorReading::InsufficientHistory { required: 10, available: 3 }
        );
        assert!(matches!(readings[2].1, IndicatorReading::Failed(_)));
        assert_eq!(readings[3].1, IndicatorReading::Unknown("MISSING".to_string()));
    }
}
