use anyhow::Result;
use datalabel_types::{ProtocolParams, QuAmount};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Deployment configuration, loaded from TOML. Every knob defaults to
/// the protocol's standard parameters, so an empty file is a valid
/// deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    pub consensus: ConsensusSettings,
    pub capacity: CapacitySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusSettings {
    /// Identical votes required to resolve a task.
    pub quorum: u32,
    /// Flat reward credited to each majority voter, in QU.
    pub reward_per_worker: QuAmount,
    pub reputation_reward: u8,
    pub reputation_penalty: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacitySettings {
    pub max_workers: usize,
    pub max_tasks: usize,
    /// Ticks an open task may sit unresolved before it can be expired.
    pub task_lifetime_ticks: u64,
}

impl Default for ConsensusSettings {
    fn default() -> Self {
        let params = ProtocolParams::default();
        Self {
            quorum: params.quorum,
            reward_per_worker: params.reward_per_worker,
            reputation_reward: params.reputation_reward,
            reputation_penalty: params.reputation_penalty,
        }
    }
}

impl Default for CapacitySettings {
    fn default() -> Self {
        let params = ProtocolParams::default();
        Self {
            max_workers: params.max_workers,
            max_tasks: params.max_tasks,
            task_lifetime_ticks: params.task_lifetime_ticks,
        }
    }
}

impl ContractConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(quorum) = env::var("DATALABEL_QUORUM") {
            if let Ok(quorum) = quorum.parse() {
                self.consensus.quorum = quorum;
            }
        }
        if let Ok(reward) = env::var("DATALABEL_REWARD_PER_WORKER") {
            if let Ok(reward) = reward.parse() {
                self.consensus.reward_per_worker = QuAmount::from_qu(reward);
            }
        }
        if let Ok(lifetime) = env::var("DATALABEL_TASK_LIFETIME_TICKS") {
            if let Ok(lifetime) = lifetime.parse() {
                self.capacity.task_lifetime_ticks = lifetime;
            }
        }
    }
}

impl From<ContractConfig> for ProtocolParams {
    fn from(config: ContractConfig) -> Self {
        ProtocolParams {
            quorum: config.consensus.quorum,
            reward_per_worker: config.consensus.reward_per_worker,
            reputation_reward: config.consensus.reputation_reward,
            reputation_penalty: config.consensus.reputation_penalty,
            max_workers: config.capacity.max_workers,
            max_tasks: config.capacity.max_tasks,
            task_lifetime_ticks: config.capacity.task_lifetime_ticks,
        }
    }
}
