use super::{
    backtesting::BacktestingConfig,
    evolution::GeneticConfig,
    fitness::FitnessConfig,
    persistence::PersistenceConfig,
    trade_management::TradeManagementConfig,
    traits::ConfigSection,
};
use crate::error::GenetraderError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix for environment overrides, e.g. `GENETRADER__GENETIC__POPULATION_SIZE=40`.
pub const ENV_PREFIX: &str = "GENETRADER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub genetic: GeneticConfig,
    pub backtesting: BacktestingConfig,
    pub trade_management: TradeManagementConfig,
    pub fitness: FitnessConfig,
    pub persistence: PersistenceConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), GenetraderError> {
        self.genetic.validate()?;
        self.backtesting.validate()?;
        self.trade_management.validate()?;
        self.fitness.validate()?;
        self.persistence.validate()?;
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, GenetraderError> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|e| GenetraderError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, GenetraderError> {
        toml::to_string_pretty(self)
            .map_err(|e| GenetraderError::Configuration(format!("Failed to serialize: {}", e)))
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GenetraderError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GenetraderError::Configuration(format!("Failed to read config: {}", e)))?;

        let config = AppConfig::from_toml_str(&contents)?;
        self.replace(config)
    }

    /// Load a TOML file with `GENETRADER__<SECTION>__<KEY>` environment overrides on top.
    pub fn load_layered<P: AsRef<Path>>(&self, path: P) -> Result<(), GenetraderError> {
        let config: AppConfig = config::Config::builder()
            .add_source(
                config::File::from(path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        self.replace(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GenetraderError> {
        let toml_str = self.get()?.to_toml_string()?;

        std::fs::write(path, toml_str)
            .map_err(|e| GenetraderError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig, GenetraderError> {
        self.config
            .read()
            .map(|config| config.clone())
            .map_err(|_| GenetraderError::Configuration("Config lock poisoned".to_string()))
    }

    /// Apply `f` to a copy and commit it only if the result validates.
    pub fn update<F>(&self, f: F) -> Result<(), GenetraderError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get()?;
        f(&mut candidate);
        candidate.validate()?;
        self.replace(candidate)
    }

    fn replace(&self, config: AppConfig) -> Result<(), GenetraderError> {
        let mut guard = self
            .config
            .write()
            .map_err(|_| GenetraderError::Configuration("Config lock poisoned".to_string()))?;
        *guard = config;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [genetic]
            population_size = 40
            generations = 25

            [trade_management]
            stop_loss_pct = 0.03
            "#,
        )
        .unwrap();

        assert_eq!(config.genetic.population_size, 40);
        assert_eq!(config.genetic.generations, 25);
        assert_eq!(config.genetic.max_indicators, 8);
        assert_eq!(config.trade_management.stop_loss_pct, 0.03);
        assert_eq!(config.trade_management.take_profit_pct, 0.04);
    }

    #[test]
    fn test_invalid_toml_section_is_rejected() {
        let result = AppConfig::from_toml_str(
            r#"
            [genetic]
            min_indicators = 9
            max_indicators = 3
            "#,
        );
        assert!(matches!(result, Err(GenetraderError::Configuration(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.genetic.seed = Some(7);
        config.fitness.criteria.min_trades = 30;
        let text = config.to_toml_string().unwrap();
        let parsed = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_update_keeps_previous_config_on_invalid_change() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.genetic.population_size = 0);
        assert!(result.is_err());
        assert_eq!(manager.get().unwrap().genetic.population_size, 5);

        manager.update(|c| c.genetic.population_size = 12).unwrap();
        assert_eq!(manager.get().unwrap().genetic.population_size, 12);
    }
}
