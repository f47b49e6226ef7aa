use crate::{
    config::GeneticConfig,
    config::ConfigSection,
    engines::{
        evaluation::evaluator::PopulationEvaluator,
        generation::{
            agent::{Agent, GenomeSpace},
            agent_bank::AgentBank,
            operators::{rank_by_fitness, tournament_selection, weakest_indices, PopulationStats},
            progress::{LogProgressCallback, ProgressCallback},
        },
    },
    error::{GenetraderError, Result},
    functions::registry::IndicatorRegistry,
};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::collections::HashSet;

/// Summary of one call to [`EvolutionEngine::evolve_one_generation`].
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Index of the generation that was evaluated
    pub generation: usize,
    pub best: Agent,
    pub stats: PopulationStats,
    /// Whether `best` beat every agent seen before
    pub improved: bool,
}

#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    pub best_agent: Agent,
    pub fitness_history: Vec<f64>,
    pub stats: Vec<PopulationStats>,
}

pub struct EvolutionEngine<E: PopulationEvaluator> {
    config: GeneticConfig,
    space: GenomeSpace,
    evaluator: E,
    population: Vec<Agent>,
    generation: usize,
    best_fitness_history: Vec<f64>,
    best_agent: Option<Agent>,
    stats_history: Vec<PopulationStats>,
    rng: StdRng,
    callback: Box<dyn ProgressCallback>,
    agent_bank: Option<AgentBank>,
}

impl<E: PopulationEvaluator> EvolutionEngine<E> {
    /// Engine drawing genomes from `catalog`, sized by the config's indicator bounds.
    pub fn new(config: GeneticConfig, catalog: Vec<String>, evaluator: E) -> Result<Self> {
        config.validate()?;
        let space = GenomeSpace::new(catalog, config.min_indicators, config.max_indicators)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut engine = Self {
            config,
            space,
            evaluator,
            population: Vec::new(),
            generation: 0,
            best_fitness_history: Vec::new(),
            best_agent: None,
            stats_history: Vec::new(),
            rng,
            callback: Box::new(LogProgressCallback),
            agent_bank: None,
        };
        engine.population = engine.random_population(engine.config.population_size);
        Ok(engine)
    }

    /// Engine drawing genomes from every indicator in `registry`.
    pub fn from_registry(
        config: GeneticConfig,
        registry: &IndicatorRegistry,
        evaluator: E,
    ) -> Result<Self> {
        Self::new(config, registry.ids(), evaluator)
    }

    pub fn space(&self) -> &GenomeSpace {
        &self.space
    }

    pub fn with_progress(mut self, callback: Box<dyn ProgressCallback>) -> Self {
        self.callback = callback;
        self
    }

    /// Persist every new best-ever agent to `bank`.
    pub fn with_agent_bank(mut self, bank: AgentBank) -> Self {
        self.agent_bank = Some(bank);
        self
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    pub fn population(&self) -> &[Agent] {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Vec<Agent> {
        &mut self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Snapshot of the best agent seen so far.
    pub fn best_agent(&self) -> Option<&Agent> {
        self.best_agent.as_ref()
    }

    pub fn fitness_history(&self) -> &[f64] {
        &self.best_fitness_history
    }

    pub fn stats_history(&self) -> &[PopulationStats] {
        &self.stats_history
    }

    pub fn agent_bank(&self) -> Option<&AgentBank> {
        self.agent_bank.as_ref()
    }

    fn random_population(&mut self, size: usize) -> Vec<Agent> {
        (0..size)
            .map(|_| Agent::random(&self.space, &mut self.rng))
            .collect()
    }

    /// Evaluates the current population and replaces it with the next generation.
    pub fn evolve_one_generation(&mut self) -> Result<GenerationReport> {
        match self.step() {
            Ok(report) => Ok(report),
            Err(e) => {
                log::error!("Generation {} failed: {}", self.generation + 1, e);
                Err(e)
            }
        }
    }

    fn step(&mut self) -> Result<GenerationReport> {
        let generation = self.generation;
        self.callback.on_generation_start(generation);

        let fitness = self.evaluator.evaluate_population(&mut self.population)?;
        if fitness.len() != self.population.len() {
            return Err(GenetraderError::Generation(format!(
                "evaluator returned {} fitness values for {} agents",
                fitness.len(),
                self.population.len()
            )));
        }
        for (agent, f) in self.population.iter_mut().zip(&fitness) {
            agent.fitness = *f;
        }
        let stats = PopulationStats::from_fitness(generation, &fitness);

        rank_by_fitness(&mut self.population);
        let best = self.population[0].clone();

        let improved = match &self.best_agent {
            Some(current) => best.fitness > current.fitness,
            None => true,
        };
        if improved {
            self.best_agent = Some(best.clone());
        }

        self.population = self.next_generation();
        self.generation += 1;
        self.best_fitness_history.push(best.fitness);
        self.stats_history.push(stats.clone());
        self.callback.on_generation_complete(&stats, best.fitness);

        Ok(GenerationReport {
            generation,
            best,
            stats,
            improved,
        })
    }

    /// Elites followed by offspring of tournament-selected parents.
    fn next_generation(&mut self) -> Vec<Agent> {
        let size = self.config.population_size;
        let mut next: Vec<Agent> = self
            .population
            .iter()
            .take(self.config.elite_count())
            .cloned()
            .collect();

        while next.len() < size {
            let (Some(i), Some(j)) = (
                tournament_selection(&self.population, self.config.tournament_size, &mut self.rng),
                tournament_selection(&self.population, self.config.tournament_size, &mut self.rng),
            ) else {
                break;
            };

            if self.rng.gen::<f64>() < self.config.crossover_prob {
                let (mut child1, mut child2) = self.population[i].crossover(
                    &self.population[j],
                    self.config.crossover_prob,
                    &self.space,
                    &mut self.rng,
                );
                child1.mutate(self.config.mutation_prob, &self.space, &mut self.rng);
                child2.mutate(self.config.mutation_prob, &self.space, &mut self.rng);
                next.push(child1);
                next.push(child2);
            }
        }

        next.truncate(size);
        next
    }

    /// Random population plus one copy of the best agent seen so far.
    fn restart_population(&mut self) {
        let mut population = match self.best_agent.clone() {
            Some(best) => {
                let mut population = self.random_population(self.config.population_size - 1);
                population.push(best);
                population
            }
            None => self.random_population(self.config.population_size),
        };
        population.shuffle(&mut self.rng);
        self.population = population;
    }

    /// Replaces the weakest members with new random agents; returns how many.
    ///
    /// Copies of the best-ever genome are never replaced, nor are the elite
    /// slots at the front of a freshly bred generation.
    fn inject_fresh_blood(&mut self, protect_elites: bool) -> usize {
        let mut protected: HashSet<usize> = HashSet::new();
        if protect_elites {
            protected.extend(0..self.config.elite_count().min(self.population.len()));
        }
        if let Some(best) = &self.best_agent {
            protected.extend(
                self.population
                    .iter()
                    .enumerate()
                    .filter(|(_, agent)| agent.same_genome(best))
                    .map(|(idx, _)| idx),
            );
        }

        let count = self.config.fresh_blood_count(self.population.len());
        let victims = weakest_indices(&self.population, count, &protected);
        for &idx in &victims {
            self.population[idx] = Agent::random(&self.space, &mut self.rng);
        }
        victims.len()
    }

    fn persist_best(&mut self, generation: usize) -> Result<()> {
        if let (Some(bank), Some(best)) = (self.agent_bank.as_mut(), self.best_agent.as_ref()) {
            let id = bank.save_agent(best, generation)?;
            log::info!("New best agent {} saved (fitness {:.4})", id, best.fitness);
        }
        Ok(())
    }

    /// Runs `generations` generations from a fresh random population, with
    /// stagnation restarts and periodic fresh blood.
    pub fn evolve(&mut self) -> Result<EvolutionOutcome> {
        self.population = self.random_population(self.config.population_size);
        self.generation = 0;
        self.best_agent = None;
        self.best_fitness_history.clear();
        self.stats_history.clear();

        let mut stagnation = 0;
        for _ in 0..self.config.generations {
            let report = self.evolve_one_generation()?;

            if report.improved {
                stagnation = 0;
                if let Err(e) = self.persist_best(report.generation) {
                    log::error!("Failed to persist best agent: {}", e);
                    return Err(e);
                }
            } else {
                stagnation += 1;
            }

            let mut restarted = false;
            if stagnation >= self.config.restart_threshold {
                let best_fitness = self.best_agent.as_ref().map_or(0.0, |a| a.fitness);
                log::warn!(
                    "No improvement for {} generations, restarting population",
                    stagnation
                );
                self.restart_population();
                self.callback.on_population_restart(report.generation, best_fitness);
                stagnation = 0;
                restarted = true;
            }

            if report.generation % self.config.fresh_blood_frequency == 0 {
                let replaced = self.inject_fresh_blood(!restarted);
                if replaced > 0 {
                    log::debug!("Injected {} fresh agents", replaced);
                    self.callback.on_fresh_blood(report.generation, replaced);
                }
            }
        }

        let best_agent = self.best_agent.clone().ok_or_else(|| {
            GenetraderError::Generation("evolution ran no generations".to_string())
        })?;

        Ok(EvolutionOutcome {
            best_agent,
            fitness_history: self.best_fitness_history.clone(),
            stats: self.stats_history.clone(),
        })
    }
}
