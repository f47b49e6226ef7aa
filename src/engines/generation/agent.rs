//! Trading agent genome: an ordered set of indicators and their weights.

use crate::{
    error::{GenetraderError, Result},
    functions::{registry::IndicatorRegistry, traits::IndicatorReading},
    types::{Bar, FitnessMetrics},
};
use rand::{seq::index::sample, seq::SliceRandom, Rng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Standard deviation of freshly drawn weights.
const INITIAL_WEIGHT_STD: f64 = 0.1;
const SMALL_JITTER_STD: f64 = 0.05;
const LARGE_JITTER_STD: f64 = 0.1;
/// Standard deviation of a crossover weight no parent can supply.
const CROSSOVER_WEIGHT_STD: f64 = 1.0;

fn gaussian<R: Rng + ?Sized>(rng: &mut R, std: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    z * std
}

/// Indicator catalog and genome size bounds agents are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeSpace {
    catalog: Vec<String>,
    min_indicators: usize,
    max_indicators: usize,
}

impl GenomeSpace {
    pub fn new(catalog: Vec<String>, min_indicators: usize, max_indicators: usize) -> Result<Self> {
        if catalog.is_empty() {
            return Err(GenetraderError::Generation(
                "indicator catalog is empty".to_string(),
            ));
        }
        if min_indicators == 0 || min_indicators > max_indicators {
            return Err(GenetraderError::Generation(format!(
                "invalid genome size bounds [{}, {}]",
                min_indicators, max_indicators
            )));
        }
        let mut seen = HashSet::new();
        let catalog = catalog.into_iter().filter(|id| seen.insert(id.clone())).collect();
        Ok(Self {
            catalog,
            min_indicators,
            max_indicators,
        })
    }

    /// Every registered indicator, with bounds from the genetic config.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn min_indicators(&self) -> usize {
        self.min_indicators
    }

    pub fn max_indicators(&self) -> usize {
        self.max_indicators
    }

    /// Size bounds clamped to a pool of `available` indicators.
    fn size_range(&self, available: usize) -> (usize, usize) {
        (
            self.min_indicators.min(available),
            self.max_indicators.min(available),
        )
    }

    fn random_indicators<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let (lo, hi) = self.size_range(self.catalog.len());
        let count = rng.gen_range(lo..=hi);
        sample(rng, self.catalog.len(), count)
            .into_iter()
            .map(|i| self.catalog[i].clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub indicators: Vec<String>,
    pub weights: Vec<f64>,
    pub fitness: f64,
    pub train_metrics: FitnessMetrics,
    pub test_metrics: FitnessMetrics,
}

impl Agent {
    /// Builds an agent from explicit parts, checking the genome invariants.
    pub fn new(indicators: Vec<String>, weights: Vec<f64>) -> Result<Self> {
        if indicators.len() != weights.len() {
            return Err(GenetraderError::Validation(format!(
                "{} indicators but {} weights",
                indicators.len(),
                weights.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = indicators.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(GenetraderError::Validation(format!(
                "duplicate indicator {}",
                dup
            )));
        }
        Ok(Self {
            indicators,
            weights,
            fitness: 0.0,
            train_metrics: FitnessMetrics::empty(),
            test_metrics: FitnessMetrics::empty(),
        })
    }

    pub fn random<R: Rng + ?Sized>(space: &GenomeSpace, rng: &mut R) -> Self {
        let indicators = space.random_indicators(rng);
        let weights = (0..indicators.len())
            .map(|_| gaussian(rng, INITIAL_WEIGHT_STD))
            .collect();
        Self {
            indicators,
            weights,
            fitness: 0.0,
            train_metrics: FitnessMetrics::empty(),
            test_metrics: FitnessMetrics::empty(),
        }
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Same indicators and weights, ignoring fitness and metrics.
    pub fn same_genome(&self, other: &Agent) -> bool {
        self.indicators == other.indicators && self.weights == other.weights
    }

    pub fn weight_norm(&self) -> f64 {
        self.weights.iter().map(|w| w * w).sum::<f64>().sqrt()
    }

    fn normalize_weights(&mut self) {
        let norm = self.weight_norm();
        if norm > 0.0 {
            for w in &mut self.weights {
                *w /= norm;
            }
        }
    }

    /// Perturbs weights with per-weight probability `prob`, occasionally
    /// redraws the whole genome or swaps one indicator, then renormalizes.
    pub fn mutate<R: Rng + ?Sized>(&mut self, prob: f64, space: &GenomeSpace, rng: &mut R) {
        for w in &mut self.weights {
            if rng.gen::<f64>() < prob {
                let tier = rng.gen::<f64>();
                if tier < 0.7 {
                    *w += gaussian(rng, SMALL_JITTER_STD);
                } else if tier < 0.9 {
                    *w += gaussian(rng, LARGE_JITTER_STD);
                } else {
                    *w = gaussian(rng, INITIAL_WEIGHT_STD);
                }
            }
        }

        if rng.gen::<f64>() < prob * 0.1 {
            self.indicators = space.random_indicators(rng);
            self.weights = (0..self.indicators.len())
                .map(|_| gaussian(rng, INITIAL_WEIGHT_STD))
                .collect();
        }

        if rng.gen::<f64>() < prob * 0.2 && !self.indicators.is_empty() {
            let idx = rng.gen_range(0..self.indicators.len());
            if let Some(candidate) = space.catalog().choose(rng) {
                if !self.indicators.contains(candidate) {
                    self.indicators[idx] = candidate.clone();
                }
            }
        }

        self.normalize_weights();
    }

    /// With probability `prob`, breeds two children from the union of both
    /// parents' indicators; otherwise returns copies of the parents.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        other: &Agent,
        prob: f64,
        space: &GenomeSpace,
        rng: &mut R,
    ) -> (Agent, Agent) {
        if rng.gen::<f64>() >= prob {
            return (self.clone(), other.clone());
        }

        let mut union = self.indicators.clone();
        for id in &other.indicators {
            if !union.contains(id) {
                union.push(id.clone());
            }
        }

        let (lo, hi) = space.size_range(union.len());
        let count = rng.gen_range(lo..=hi);

        let child1 = Self::child_from(&union, count, [self, other], rng);
        let child2 = Self::child_from(&union, count, [other, self], rng);
        (child1, child2)
    }

    fn child_from<R: Rng + ?Sized>(
        union: &[String],
        count: usize,
        parents: [&Agent; 2],
        rng: &mut R,
    ) -> Agent {
        let indicators: Vec<String> = sample(rng, union.len(), count)
            .into_iter()
            .map(|i| union[i].clone())
            .collect();
        let weights = indicators
            .iter()
            .map(|id| {
                parents
                    .iter()
                    .find_map(|p| p.weight_of(id))
                    .unwrap_or_else(|| gaussian(rng, CROSSOVER_WEIGHT_STD))
            })
            .collect();
        Agent {
            indicators,
            weights,
            fitness: 0.0,
            train_metrics: FitnessMetrics::empty(),
            test_metrics: FitnessMetrics::empty(),
        }
    }

    pub fn weight_of(&self, id: &str) -> Option<f64> {
        self.indicators
            .iter()
            .position(|i| i == id)
            .map(|idx| self.weights[idx])
    }

    /// Weighted sum of indicator readings over `history`.
    pub fn get_signal(&self, history: &[Bar], registry: &IndicatorRegistry) -> f64 {
        self.indicators
            .iter()
            .zip(&self.weights)
            .map(|(id, w)| w * registry.read(id, history).contribution())
            .sum()
    }

    /// Per-indicator readings, useful to see why an indicator stays silent.
    pub fn signal_breakdown(
        &self,
        history: &[Bar],
        registry: &IndicatorRegistry,
    ) -> Vec<(String, IndicatorReading)> {
        self.indicators
            .iter()
            .map(|id| (id.clone(), registry.read(id, history)))
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let agent: Agent = bincode::deserialize(bytes)?;
        if agent.indicators.len() != agent.weights.len() {
            return Err(GenetraderError::Persistence(
                "stored agent has mismatched indicators and weights".to_string(),
            ));
        }
        Ok(agent)
    }

    /// Flat record of fitness and both splits' metrics.
    pub fn metrics_record(&self) -> BTreeMap<String, f64> {
        let mut record = BTreeMap::new();
        record.insert("fitness".to_string(), self.fitness);
        for (name, value) in self.train_metrics.to_map() {
            record.insert(format!("train_{}", name), value);
        }
        for (name, value) in self.test_metrics.to_map() {
            record.insert(format!("test_{}", name), value);
        }
        record
    }
}

/// Each agent's share of the summed positive out-of-sample Sharpe ratios.
pub fn ensemble_weights(agents: &[Agent]) -> Vec<f64> {
    let sharpes: Vec<f64> = agents
        .iter()
        .map(|a| a.test_metrics.sharpe_ratio.max(0.0))
        .collect();
    let total: f64 = sharpes.iter().sum();
    if total <= 0.0 {
        return vec![0.0; agents.len()];
    }
    sharpes.iter().map(|s| s / total).collect()
}
