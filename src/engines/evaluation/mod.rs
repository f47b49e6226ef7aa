pub mod backtester;
pub mod evaluator;
pub mod pool;

pub use backtester::{BacktestEngine, BacktestResult, LogTradeObserver, OpenPosition, TradeObserver};
pub use evaluator::{AgentEvaluation, PopulationEvaluator, StrategyEvaluator};
pub use pool::EvaluationPool;
