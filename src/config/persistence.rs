use super::traits::ConfigSection;
use crate::error::GenetraderError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Agent bank directory; `None` disables persistence.
    pub agent_bank_path: Option<PathBuf>,
}

impl ConfigSection for PersistenceConfig {
    fn section_name() -> &'static str {
        "persistence"
    }

    fn validate(&self) -> Result<(), GenetraderError> {
        if let Some(path) = &self.agent_bank_path {
            if path.as_os_str().is_empty() {
                return Err(GenetraderError::Configuration(
                    "agent_bank_path must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
