pub mod engine;
pub mod fitness;
pub mod profitability;
pub mod risk;

pub use engine::MetricsEngine;
pub use fitness::{combined_fitness, weighted_fitness, FitnessWeights};
pub use profitability::ProfitabilityMetrics;
pub use risk::RiskMetrics;

/// Guards ratio denominators.
pub const EPSILON: f64 = 1e-10;
