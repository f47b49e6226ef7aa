use super::traits::{check_probability, ConfigSection};
use crate::error::GenetraderError;
use serde::{Deserialize, Serialize};

/// Fraction of the population carried over unchanged each generation.
pub const ELITE_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    pub generations: usize,
    pub population_size: usize,
    pub crossover_prob: f64,
    pub mutation_prob: f64,
    pub tournament_size: usize,
    pub fresh_blood_rate: f64,
    pub fresh_blood_frequency: usize,
    pub restart_threshold: usize,
    pub min_indicators: usize,
    pub max_indicators: usize,
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            generations: 10,
            population_size: 5,
            crossover_prob: 0.9,
            mutation_prob: 0.25,
            tournament_size: 3,
            fresh_blood_rate: 0.15,
            fresh_blood_frequency: 3,
            restart_threshold: 20,
            min_indicators: 4,
            max_indicators: 8,
            seed: None,
        }
    }
}

impl GeneticConfig {
    /// Number of elites copied into the next generation (10%, at least one).
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * ELITE_FRACTION) as usize)
            .max(1)
            .min(self.population_size)
    }

    /// Number of members replaced on each fresh blood injection.
    pub fn fresh_blood_count(&self, population_len: usize) -> usize {
        ((population_len as f64 * self.fresh_blood_rate) as usize).min(population_len)
    }
}

impl ConfigSection for GeneticConfig {
    fn section_name() -> &'static str {
        "genetic"
    }

    fn validate(&self) -> Result<(), GenetraderError> {
        if self.population_size == 0 {
            return Err(GenetraderError::Configuration(
                "Population size must be greater than 0".to_string(),
            ));
        }
        if self.min_indicators == 0 {
            return Err(GenetraderError::Configuration(
                "Agents need at least one indicator".to_string(),
            ));
        }
        if self.min_indicators > self.max_indicators {
            return Err(GenetraderError::Configuration(format!(
                "min_indicators ({}) exceeds max_indicators ({})",
                self.min_indicators, self.max_indicators
            )));
        }
        check_probability("crossover_prob", self.crossover_prob)?;
        check_probability("mutation_prob", self.mutation_prob)?;
        check_probability("fresh_blood_rate", self.fresh_blood_rate)?;
        if self.crossover_prob == 0.0 {
            return Err(GenetraderError::Configuration(
                "crossover_prob must be greater than 0 to fill the next generation".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(GenetraderError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }
        if self.fresh_blood_frequency == 0 {
            return Err(GenetraderError::Configuration(
                "fresh_blood_frequency must be at least 1".to_string(),
            ));
        }
        if self.restart_threshold == 0 {
            return Err(GenetraderError::Configuration(
                "restart_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GeneticConfig::default().validate().is_ok());
    }

    #[test]
    fn test_elite_count_has_floor_of_one() {
        let mut config = GeneticConfig::default();
        config.population_size = 5;
        assert_eq!(config.elite_count(), 1);
        config.population_size = 50;
        assert_eq!(config.elite_count(), 5);
    }

    #[test]
    fn test_rejects_inverted_indicator_bounds() {
        let config = GeneticConfig {
            min_indicators: 6,
            max_indicators: 4,
            ..GeneticConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenetraderError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_empty_population() {
        let config = GeneticConfig {
            population_size: 0,
            ..GeneticConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let config = GeneticConfig {
            mutation_prob: 1.5,
            ..GeneticConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
