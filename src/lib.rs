//! Genetic search over weighted-indicator trading agents, scored by a
//! bar-by-bar backtester on a training split and a later test split.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod functions;
pub mod types;

pub use config::{AppConfig, ConfigManager, GeneticConfig, TradeManagementConfig};
pub use data::{MarketData, SimpleSplitter};
pub use engines::evaluation::{BacktestEngine, BacktestResult, PopulationEvaluator, StrategyEvaluator};
pub use engines::generation::{Agent, AgentBank, EvolutionEngine, EvolutionOutcome, GenomeSpace};
pub use engines::metrics::FitnessWeights;
pub use error::{GenetraderError, Result};
pub use functions::{Indicator, IndicatorReading, IndicatorRegistry};
pub use types::{Bar, FitnessMetrics, TradeResult};
