use genetrader::{
    config::GeneticConfig,
    engines::evaluation::PopulationEvaluator,
    engines::generation::{
        Agent, AgentBank, ChannelProgressCallback, EvolutionEngine, ProgressMessage,
    },
    error::Result,
};
use std::sync::mpsc;

/// Fitness is the sum of the agent's weights.
struct WeightSum;

impl PopulationEvaluator for WeightSum {
    fn evaluate_population(&self, agents: &mut [Agent]) -> Result<Vec<f64>> {
        let fitness: Vec<f64> = agents.iter().map(|a| a.weights.iter().sum::<f64>()).collect();
        for (agent, f) in agents.iter_mut().zip(&fitness) {
            agent.fitness = *f;
        }
        Ok(fitness)
    }
}

/// Every agent scores the same, so the best never improves after generation 0.
struct Constant(f64);

impl PopulationEvaluator for Constant {
    fn evaluate_population(&self, agents: &mut [Agent]) -> Result<Vec<f64>> {
        Ok(vec![self.0; agents.len()])
    }
}

fn catalog() -> Vec<String> {
    (0..16).map(|i| format!("IND{:02}", i)).collect()
}

fn holds_genome(population: &[Agent], genome: &Agent) -> bool {
    population.iter().any(|agent| agent.same_genome(genome))
}

fn config(generations: usize) -> GeneticConfig {
    GeneticConfig {
        generations,
        population_size: 20,
        seed: Some(2024),
        ..GeneticConfig::default()
    }
}

#[test]
fn test_best_fitness_never_decreases() {
    let mut engine = EvolutionEngine::new(config(15), catalog(), WeightSum).unwrap();
    let outcome = engine.evolve().unwrap();

    assert_eq!(outcome.fitness_history.len(), 15);
    assert_eq!(outcome.stats.len(), 15);
    for pair in outcome.fitness_history.windows(2) {
        assert!(pair[1] >= pair[0], "history went down: {:?}", outcome.fitness_history);
    }
    let max = outcome.fitness_history.iter().copied().fold(f64::MIN, f64::max);
    assert_eq!(outcome.best_agent.fitness, max);
    for (g, stats) in outcome.stats.iter().enumerate() {
        assert_eq!(stats.generation, g);
        assert!(stats.min_fitness <= stats.avg_fitness && stats.avg_fitness <= stats.max_fitness);
    }
}

#[test]
fn test_population_size_is_constant() {
    let mut engine = EvolutionEngine::new(config(8), catalog(), WeightSum).unwrap();
    for _ in 0..8 {
        engine.evolve_one_generation().unwrap();
        assert_eq!(engine.population().len(), 20);
        for agent in engine.population() {
            assert_eq!(agent.indicators.len(), agent.weights.len());
            assert!((4..=8).contains(&agent.indicators.len()));
        }
    }
}

#[test]
fn test_best_agent_is_a_snapshot() {
    let mut engine = EvolutionEngine::new(config(3), catalog(), WeightSum).unwrap();
    engine.evolve().unwrap();
    let snapshot = engine.best_agent().cloned().unwrap();

    for agent in engine.population_mut().iter_mut() {
        for w in agent.weights.iter_mut() {
            *w = 0.0;
        }
        agent.fitness = -1.0;
    }

    assert_eq!(engine.best_agent(), Some(&snapshot));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let mut engine = EvolutionEngine::new(config(6), catalog(), WeightSum).unwrap();
        engine.evolve().unwrap()
    };
    let (a, b) = (run(), run());
    assert_eq!(a.fitness_history, b.fitness_history);
    assert_eq!(a.best_agent, b.best_agent);
}

#[test]
fn test_stagnation_triggers_restart() {
    let (tx, rx) = mpsc::channel();
    let config = GeneticConfig {
        restart_threshold: 3,
        fresh_blood_rate: 0.0,
        ..config(6)
    };
    let mut engine = EvolutionEngine::new(config, catalog(), Constant(0.5))
        .unwrap()
        .with_progress(Box::new(ChannelProgressCallback::new(tx)));
    let outcome = engine.evolve().unwrap();
    drop(engine);

    let restarts: Vec<usize> = rx
        .iter()
        .filter_map(|msg| match msg {
            ProgressMessage::PopulationRestart { generation, .. } => Some(generation),
            ProgressMessage::FreshBlood { .. } => panic!("fresh blood is disabled"),
            _ => None,
        })
        .collect();
    assert_eq!(restarts, vec![3]);
    assert_eq!(outcome.fitness_history, vec![0.5; 6]);
}

#[test]
fn test_restart_keeps_best_genome() {
    let config = GeneticConfig {
        restart_threshold: 3,
        fresh_blood_rate: 0.0,
        ..config(4)
    };
    let mut engine = EvolutionEngine::new(config, catalog(), Constant(0.5)).unwrap();
    let outcome = engine.evolve().unwrap();

    // The run ends right after the restart at generation 3.
    let population = engine.population();
    assert_eq!(population.len(), 20);
    assert_eq!(
        population.iter().filter(|a| a.same_genome(&outcome.best_agent)).count(),
        1
    );
}

#[test]
fn test_fresh_blood_spares_restarted_best() {
    let (tx, rx) = mpsc::channel();
    let config = GeneticConfig {
        restart_threshold: 3,
        fresh_blood_frequency: 3,
        fresh_blood_rate: 0.5,
        ..config(4)
    };
    let mut engine = EvolutionEngine::new(config, catalog(), Constant(-0.5))
        .unwrap()
        .with_progress(Box::new(ChannelProgressCallback::new(tx)));
    let outcome = engine.evolve().unwrap();

    assert!(holds_genome(engine.population(), &outcome.best_agent));
    drop(engine);

    let events: Vec<ProgressMessage> = rx
        .iter()
        .filter(|msg| {
            matches!(
                msg,
                ProgressMessage::PopulationRestart { .. } | ProgressMessage::FreshBlood { .. }
            )
        })
        .collect();
    assert_eq!(
        events,
        vec![
            ProgressMessage::FreshBlood {
                generation: 0,
                replaced: 10
            },
            ProgressMessage::PopulationRestart {
                generation: 3,
                best_fitness: -0.5
            },
            ProgressMessage::FreshBlood {
                generation: 3,
                replaced: 10
            },
        ]
    );
}

#[test]
fn test_fresh_blood_spares_negative_elites() {
    let config = GeneticConfig {
        fresh_blood_frequency: 1,
        fresh_blood_rate: 0.5,
        ..config(1)
    };
    let mut engine = EvolutionEngine::new(config, catalog(), Constant(-0.5)).unwrap();
    let outcome = engine.evolve().unwrap();

    // Offspring carry 0.0 and outrank the -0.5 elites, which must still survive.
    let population = engine.population();
    assert!(population[0].same_genome(&outcome.best_agent));
    assert_eq!(population[0].fitness, -0.5);
    assert_eq!(population[1].fitness, -0.5);
}

#[test]
fn test_genome_size_bounds_come_from_config() {
    let config = GeneticConfig {
        min_indicators: 2,
        max_indicators: 2,
        ..config(3)
    };
    let mut engine = EvolutionEngine::new(config, catalog(), WeightSum).unwrap();
    assert!(engine.population().iter().all(|a| a.len() == 2));
    let outcome = engine.evolve().unwrap();
    assert!(engine.population().iter().all(|a| a.len() == 2));
    assert_eq!(outcome.best_agent.len(), 2);
}

#[test]
fn test_fresh_blood_is_periodic() {
    let (tx, rx) = mpsc::channel();
    let config = GeneticConfig {
        fresh_blood_frequency: 2,
        fresh_blood_rate: 0.25,
        ..config(5)
    };
    let mut engine = EvolutionEngine::new(config, catalog(), WeightSum)
        .unwrap()
        .with_progress(Box::new(ChannelProgressCallback::new(tx)));
    engine.evolve().unwrap();
    drop(engine);

    let injections: Vec<(usize, usize)> = rx
        .iter()
        .filter_map(|msg| match msg {
            ProgressMessage::FreshBlood { generation, replaced } => Some((generation, replaced)),
            _ => None,
        })
        .collect();
    assert_eq!(injections, vec![(0, 5), (2, 5), (4, 5)]);
}

#[test]
fn test_improvements_are_banked() {
    let dir = std::env::temp_dir().join(format!("genetrader-evolution-bank-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let bank = AgentBank::open(&dir).unwrap();
    let mut engine = EvolutionEngine::new(config(4), catalog(), WeightSum)
        .unwrap()
        .with_agent_bank(bank);
    let outcome = engine.evolve().unwrap();

    let bank = engine.agent_bank().unwrap();
    assert!(!bank.is_empty());
    let (best_id, _) = bank.get_best_agents(1, "fitness").remove(0);
    let stored = bank.load_agent(&best_id).unwrap();
    assert_eq!(stored, outcome.best_agent);

    std::fs::remove_dir_all(&dir).unwrap();
}
