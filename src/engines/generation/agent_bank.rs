//! On-disk archive of agents worth keeping across runs.
//!
//! Layout:
//! ```text
//! base/metadata.json
//! base/generation_{g}/AG-{gggg}-{nnnn}.bin
//! ```

use crate::{
    config::FitnessCriteria,
    engines::generation::agent::Agent,
    error::{GenetraderError, Result},
    types::FitnessMetrics,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub generation: usize,
    /// Relative to the bank directory
    pub path: PathBuf,
    pub indicators: Vec<String>,
    pub metrics: BTreeMap<String, f64>,
    pub train_metrics: FitnessMetrics,
    pub test_metrics: FitnessMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BankMetadata {
    agents: BTreeMap<String, AgentRecord>,
}

pub struct AgentBank {
    base_path: PathBuf,
    metadata: BankMetadata,
}

impl AgentBank {
    /// Opens the bank at `base_path`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        let metadata_file = base_path.join(METADATA_FILE);
        let metadata = if metadata_file.exists() {
            serde_json::from_str(&fs::read_to_string(&metadata_file)?)?
        } else {
            BankMetadata::default()
        };

        Ok(Self { base_path, metadata })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn len(&self) -> usize {
        self.metadata.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.agents.is_empty()
    }

    pub fn record(&self, id: &str) -> Option<&AgentRecord> {
        self.metadata.agents.get(id)
    }

    /// Stores `agent` under a fresh id and rewrites the metadata file.
    pub fn save_agent(&mut self, agent: &Agent, generation: usize) -> Result<String> {
        let relative_dir = PathBuf::from(format!("generation_{}", generation));
        fs::create_dir_all(self.base_path.join(&relative_dir))?;

        let id = self.next_id(generation);
        let relative_path = relative_dir.join(format!("{}.bin", id));
        fs::write(self.base_path.join(&relative_path), agent.to_bytes()?)?;

        self.metadata.agents.insert(
            id.clone(),
            AgentRecord {
                generation,
                path: relative_path,
                indicators: agent.indicators.clone(),
                metrics: agent.metrics_record(),
                train_metrics: agent.train_metrics.clone(),
                test_metrics: agent.test_metrics.clone(),
            },
        );
        self.write_metadata()?;

        log::debug!("Saved agent {} (fitness {:.4})", id, agent.fitness);
        Ok(id)
    }

    pub fn load_agent(&self, id: &str) -> Result<Agent> {
        let record = self
            .metadata
            .agents
            .get(id)
            .ok_or_else(|| GenetraderError::Persistence(format!("Agent {} not found", id)))?;
        let bytes = fs::read(self.base_path.join(&record.path))?;
        Agent::from_bytes(&bytes)
    }

    /// Top `n` records by a key of the metrics record, e.g. `test_sharpe_ratio`.
    /// Records without that key rank last.
    pub fn get_best_agents(&self, n: usize, metric: &str) -> Vec<(String, AgentRecord)> {
        let mut agents: Vec<(String, AgentRecord)> = self
            .metadata
            .agents
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();
        let score = |record: &AgentRecord| {
            record.metrics.get(metric).copied().unwrap_or(f64::NEG_INFINITY)
        };
        agents.sort_by(|a, b| {
            score(&b.1)
                .partial_cmp(&score(&a.1))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        agents.truncate(n);
        agents
    }

    /// Ids of agents whose out-of-sample metrics pass `criteria`.
    pub fn qualified_agents(&self, criteria: &FitnessCriteria) -> Vec<String> {
        self.metadata
            .agents
            .iter()
            .filter(|(_, record)| criteria.accepts(&record.test_metrics))
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn next_id(&self, generation: usize) -> String {
        let mut n = self.metadata.agents.len();
        loop {
            let id = format!("AG-{:04}-{:04}", generation, n);
            if !self.metadata.agents.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    fn write_metadata(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.metadata)?;
        fs::write(self.base_path.join(METADATA_FILE), json)?;
        Ok(())
    }
}
