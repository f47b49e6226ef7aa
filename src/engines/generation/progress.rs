use super::operators::PopulationStats;
use std::sync::mpsc::Sender;

/// Observer of an evolution run, injected into the engine.
pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, stats: &PopulationStats, best_fitness: f64);
    fn on_population_restart(&mut self, _generation: usize, _best_fitness: f64) {}
    fn on_fresh_blood(&mut self, _generation: usize, _replaced: usize) {}
}

pub struct LogProgressCallback;

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting", generation + 1);
    }

    fn on_generation_complete(&mut self, stats: &PopulationStats, best_fitness: f64) {
        log::info!(
            "Generation {} complete. Best fitness: {:.4}, avg {:.4}, std {:.4}",
            stats.generation + 1,
            best_fitness,
            stats.avg_fitness,
            stats.std_fitness
        );
    }

    fn on_population_restart(&mut self, generation: usize, best_fitness: f64) {
        log::warn!(
            "Population restarted after generation {} (best fitness {:.4})",
            generation + 1,
            best_fitness
        );
    }

    fn on_fresh_blood(&mut self, generation: usize, replaced: usize) {
        log::debug!("Generation {}: {} agents replaced by fresh blood", generation + 1, replaced);
    }
}

/// Forwards progress to another thread, e.g. a dashboard.
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete { stats: PopulationStats, best_fitness: f64 },
    PopulationRestart { generation: usize, best_fitness: f64 },
    FreshBlood { generation: usize, replaced: usize },
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

// Send errors mean the receiver hung up; evolution carries on regardless.
impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, stats: &PopulationStats, best_fitness: f64) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            stats: stats.clone(),
            best_fitness,
        });
    }

    fn on_population_restart(&mut self, generation: usize, best_fitness: f64) {
        let _ = self.sender.send(ProgressMessage::PopulationRestart {
            generation,
            best_fitness,
        });
    }

    fn on_fresh_blood(&mut self, generation: usize, replaced: usize) {
        let _ = self.sender.send(ProgressMessage::FreshBlood { generation, replaced });
    }
}
