use crate::engines::generation::agent::Agent;
use crate::functions::primitives::{mean, std_dev};
use rand::{seq::index::sample, Rng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Tournament selection: samples `tournament_size` distinct members and
/// returns the index of the fittest. The first one sampled wins ties.
pub fn tournament_selection<R: Rng + ?Sized>(
    population: &[Agent],
    tournament_size: usize,
    rng: &mut R,
) -> Option<usize> {
    if population.is_empty() {
        return None;
    }
    let size = tournament_size.clamp(1, population.len());

    let mut best: Option<usize> = None;
    for idx in sample(rng, population.len(), size) {
        match best {
            Some(b) if population[idx].fitness <= population[b].fitness => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Stable sort by fitness, fittest first.
pub fn rank_by_fitness(population: &mut [Agent]) {
    population.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap_or(Ordering::Equal));
}

/// Indices of the `count` lowest-fitness members outside `protected`, weakest first.
pub fn weakest_indices(
    population: &[Agent],
    count: usize,
    protected: &HashSet<usize>,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..population.len())
        .filter(|idx| !protected.contains(idx))
        .collect();
    order.sort_by(|&a, &b| {
        population[a]
            .fitness
            .partial_cmp(&population[b].fitness)
            .unwrap_or(Ordering::Equal)
    });
    order.truncate(count);
    order
}

/// Fitness summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub generation: usize,
    pub avg_fitness: f64,
    pub max_fitness: f64,
    pub min_fitness: f64,
    pub std_fitness: f64,
}

impl PopulationStats {
    pub fn from_fitness(generation: usize, fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                generation,
                avg_fitness: 0.0,
                max_fitness: 0.0,
                min_fitness: 0.0,
                std_fitness: 0.0,
            };
        }
        Self {
            generation,
            avg_fitness: mean(fitness),
            max_fitness: fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_fitness: fitness.iter().copied().fold(f64::INFINITY, f64::min),
            std_fitness: std_dev(fitness),
        }
    }
}
