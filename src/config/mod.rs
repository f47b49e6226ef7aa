pub mod traits;
pub mod evolution;
pub mod backtesting;
pub mod trade_management;
pub mod fitness;
pub mod persistence;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::{GeneticConfig, ELITE_FRACTION};
pub use backtesting::BacktestingConfig;
pub use trade_management::TradeManagementConfig;
pub use fitness::{FitnessConfig, FitnessCriteria};
pub use persistence::PersistenceConfig;
pub use traits::ConfigSection;
