use crate::functions::{
    indicators::{
        momentum::{Momentum, Stochastic, WilliamsR, CCI, CMO, ROC, RSI},
        trend::{DEMA, EMA, MACD, SMA, WMA},
        volatility::{BollingerBands, Donchian, Keltner, ATR},
        volume::{CMF, MFI, OBV, VWMA},
    },
    strategy::{ResolvedStrategy, Term},
    traits::{read_indicator, Indicator, IndicatorReading},
};
use crate::types::Bar;
use std::{collections::HashMap, sync::Arc};

/// Identifier → indicator table, built once and shared read-only by every worker.
#[derive(Clone)]
pub struct IndicatorRegistry {
    indicators: HashMap<String, Arc<dyn Indicator>>,
}

impl IndicatorRegistry {
    /// Registry holding the built-in catalog.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }

    pub fn empty() -> Self {
        Self {
            indicators: HashMap::new(),
        }
    }

    /// Registers `indicator` under its alias, returning any indicator it displaced.
    pub fn register(&mut self, indicator: Arc<dyn Indicator>) -> Option<Arc<dyn Indicator>> {
        self.indicators.insert(indicator.alias().to_string(), indicator)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Indicator>> {
        self.indicators.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.indicators.contains_key(id)
    }

    /// Registered identifiers in sorted order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.indicators.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn read(&self, id: &str, history: &[Bar]) -> IndicatorReading {
        match self.indicators.get(id) {
            Some(indicator) => read_indicator(indicator.as_ref(), history),
            None => IndicatorReading::Unknown(id.to_string()),
        }
    }

    /// Pairs each identifier with its weight and indicator. Unknown identifiers
    /// are kept as neutral terms.
    pub fn resolve(&self, ids: &[String], weights: &[f64]) -> ResolvedStrategy {
        let terms: Vec<Term> = ids
            .iter()
            .zip(weights)
            .map(|(id, weight)| Term {
                id: id.clone(),
                weight: *weight,
                indicator: self.get(id),
            })
            .collect();

        let strategy = ResolvedStrategy::new(terms);
        let unknown = strategy.unknown_ids();
        if !unknown.is_empty() {
            log::warn!("Unknown indicators contribute 0.0: {}", unknown.join(", "));
        }
        strategy
    }

    fn register_builtins(&mut self) {
        let indicators: Vec<Arc<dyn Indicator>> = vec![
            Arc::new(SMA::new(20)),
            Arc::new(EMA::new(12)),
            Arc::new(WMA::new(10)),
            Arc::new(DEMA::new(14)),
            Arc::new(MACD::new(12, 26, 9)),
            Arc::new(RSI::new(14)),
            Arc::new(Momentum::new(10)),
            Arc::new(ROC::new(10)),
            Arc::new(Stochastic::new(14)),
            Arc::new(WilliamsR::new(14)),
            Arc::new(CCI::new(20)),
            Arc::new(CMO::new(14)),
            Arc::new(ATR::new(14)),
            Arc::new(BollingerBands::new(20, 2.0)),
            Arc::new(Donchian::new(20)),
            Arc::new(Keltner::new(20, 2.0)),
            Arc::new(OBV::new(20)),
            Arc::new(VWMA::new(20)),
            Arc::new(MFI::new(14)),
            Arc::new(CMF::new(20)),
        ];

        for indicator in indicators {
            self.register(indicator);
        }
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::traits::FnIndicator;

    #[test]
    fn test_registry_indicator_retrieval() {
        let registry = IndicatorRegistry::new();
        let rsi = registry.get("RSI");
        assert!(rsi.is_some());
        assert_eq!(rsi.unwrap().alias(), "RSI");
        assert_eq!(registry.len(), 20);
    }

    #[test]
    fn test_indicator_not_found() {
        let registry = IndicatorRegistry::new();
        assert!(registry.get("NonExistent").is_none());
        assert_eq!(
            registry.read("NonExistent", &[]),
            IndicatorReading::Unknown("NonExistent".to_string())
        );
    }

    #[test]
    fn test_ids_are_sorted() {
        let ids = IndicatorRegistry::new().ids();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_register_replaces_alias() {
        let mut registry = IndicatorRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry
            .register(Arc::new(FnIndicator::new("ONE", 0, |_: &[Bar]| Ok(1.0))))
            .is_none());
        let displaced = registry.register(Arc::new(FnIndicator::new("ONE", 0, |_: &[Bar]| Ok(2.0))));
        assert!(displaced.is_some());
        assert_eq!(registry.read("ONE", &[]), IndicatorReading::Value(2.0));
    }
}
