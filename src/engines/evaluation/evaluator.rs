use crate::{
    config::{AppConfig, TradeManagementConfig},
    data::{DataSplit, MarketData},
    engines::{
        evaluation::{backtester::BacktestEngine, pool::EvaluationPool},
        generation::agent::Agent,
        metrics::{combined_fitness, weighted_fitness, FitnessWeights},
    },
    error::{GenetraderError, Result},
    functions::registry::IndicatorRegistry,
    types::FitnessMetrics,
};
use polars::prelude::DataFrame;
use std::sync::Arc;

/// Scores a whole population. The evolution engine only sees this seam.
pub trait PopulationEvaluator: Send {
    /// Sets each agent's fitness and metrics and returns the fitness values
    /// in population order.
    fn evaluate_population(&self, agents: &mut [Agent]) -> Result<Vec<f64>>;
}

/// Backtests each agent on a training series and a later test series and
/// scores it by the weaker of the two, minus a penalty for their divergence.
pub struct StrategyEvaluator {
    train: Arc<MarketData>,
    test: Arc<MarketData>,
    engine: BacktestEngine,
    registry: Arc<IndicatorRegistry>,
    weights: FitnessWeights,
    pool: EvaluationPool,
}

/// Outcome of scoring one agent on both splits.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEvaluation {
    pub fitness: f64,
    pub train_fitness: f64,
    pub test_fitness: f64,
    pub train_metrics: FitnessMetrics,
    pub test_metrics: FitnessMetrics,
}

impl StrategyEvaluator {
    pub fn new(
        train: MarketData,
        test: MarketData,
        engine: BacktestEngine,
        registry: Arc<IndicatorRegistry>,
        weights: FitnessWeights,
        pool: EvaluationPool,
    ) -> Result<Self> {
        if train.is_empty() || test.is_empty() {
            return Err(GenetraderError::Validation(
                "Training and test data must both contain bars".to_string(),
            ));
        }
        train.ensure_precedes(&test)?;

        Ok(Self {
            train: Arc::new(train),
            test: Arc::new(test),
            engine,
            registry,
            weights,
            pool,
        })
    }

    /// Builds the evaluator from OHLCV tables and the application config.
    pub fn from_frames(
        train: &DataFrame,
        test: &DataFrame,
        registry: Arc<IndicatorRegistry>,
        config: &AppConfig,
    ) -> Result<Self> {
        let engine = BacktestEngine::new(
            config.backtesting.initial_capital,
            config.trade_management.clone(),
        )?;
        let pool = EvaluationPool::new(config.backtesting.reserved_threads)?;
        Self::new(
            MarketData::from_dataframe(train)?,
            MarketData::from_dataframe(test)?,
            engine,
            registry,
            config.fitness.weights.clone(),
            pool,
        )
    }

    pub fn from_split(
        split: &DataSplit,
        registry: Arc<IndicatorRegistry>,
        config: &AppConfig,
    ) -> Result<Self> {
        Self::from_frames(&split.train, &split.test, registry, config)
    }

    /// Evaluator with default trade management and fitness weights.
    pub fn with_defaults(
        train: MarketData,
        test: MarketData,
        registry: Arc<IndicatorRegistry>,
        initial_capital: f64,
        reserved_threads: usize,
    ) -> Result<Self> {
        let engine = BacktestEngine::new(initial_capital, TradeManagementConfig::default())?;
        Self::new(
            train,
            test,
            engine,
            registry,
            FitnessWeights::default(),
            EvaluationPool::new(reserved_threads)?,
        )
    }

    pub fn train(&self) -> &MarketData {
        &self.train
    }

    pub fn test(&self) -> &MarketData {
        &self.test
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    /// Scores one agent without touching it.
    pub fn evaluate_agent(&self, agent: &Agent) -> AgentEvaluation {
        let strategy = self.registry.resolve(&agent.indicators, &agent.weights);
        let train_metrics = self.engine.run_resolved(&strategy, &self.train).metrics;
        let test_metrics = self.engine.run_resolved(&strategy, &self.test).metrics;

        let train_fitness = weighted_fitness(&train_metrics, &self.weights);
        let test_fitness = weighted_fitness(&test_metrics, &self.weights);

        AgentEvaluation {
            fitness: combined_fitness(train_fitness, test_fitness),
            train_fitness,
            test_fitness,
            train_metrics,
            test_metrics,
        }
    }
}

impl PopulationEvaluator for StrategyEvaluator {
    fn evaluate_population(&self, agents: &mut [Agent]) -> Result<Vec<f64>> {
        let evaluations = self.pool.map(agents, |agent| self.evaluate_agent(agent));

        let fitness = agents
            .iter_mut()
            .zip(evaluations)
            .map(|(agent, evaluation)| {
                agent.fitness = evaluation.fitness;
                agent.train_metrics = evaluation.train_metrics;
                agent.test_metrics = evaluation.test_metrics;
                evaluation.fitness
            })
            .collect();
        Ok(fitness)
    }
}
