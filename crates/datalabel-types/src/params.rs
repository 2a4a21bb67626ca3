use crate::QuAmount;
use serde::{Deserialize, Serialize};

/// Policy constants of the labeling protocol.
///
/// None of these are load-bearing logic: the resolution algorithm works
/// for any quorum >= 1 and any reward, and the capacities exist because
/// the hosting environment requires deterministic, bounded memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Matching votes required to accept a label ("rule of 3").
    pub quorum: u32,
    /// Reward credited to each majority voter when a task resolves.
    pub reward_per_worker: QuAmount,
    /// Reputation gained by each majority voter on resolution.
    pub reputation_reward: u8,
    /// Reputation lost by each minority voter on resolution.
    pub reputation_penalty: u8,
    /// Worker registry capacity.
    pub max_workers: usize,
    /// Task table capacity.
    pub max_tasks: usize,
    /// Ticks an unresolved task stays open before the expiry sweep may
    /// close it.
    pub task_lifetime_ticks: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            quorum: 3,
            reward_per_worker: QuAmount::from_qu(1000),
            reputation_reward: 1,
            reputation_penalty: 1,
            max_workers: 1024,
            max_tasks: 100,
            task_lifetime_ticks: 100_000,
        }
    }
}
