pub mod agent;
pub mod agent_bank;
pub mod evolution_engine;
pub mod operators;
pub mod progress;

pub use agent::{ensemble_weights, Agent, GenomeSpace};
pub use agent_bank::{AgentBank, AgentRecord};
pub use evolution_engine::{EvolutionEngine, EvolutionOutcome, GenerationReport};
pub use operators::{tournament_selection, PopulationStats};
pub use progress::{ChannelProgressCallback, LogProgressCallback, ProgressCallback, ProgressMessage};
