use crate::error::GenetraderError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), GenetraderError>;
}

pub(crate) fn check_probability(name: &str, value: f64) -> Result<(), GenetraderError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GenetraderError::Configuration(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), GenetraderError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(GenetraderError::Configuration(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}
