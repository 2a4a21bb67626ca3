use crate::registry::WorkerRegistry;
use crate::tally::{TaskState, TaskTable};
use datalabel_economics::RewardPool;
use datalabel_types::{Label, LabelError, ProtocolParams, QuAmount, Result, TaskHash, WorkerId};
use tracing::{debug, info, warn};

/// Outcome of an accepted vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub task: TaskHash,
    pub label: Label,
    /// Votes now recorded for `label`, this one included.
    pub tally: usize,
    /// Present when this vote completed consensus and paid the majority.
    pub resolution: Option<Resolution>,
}

/// What a resolution settled: the accepted label, who was paid how
/// much, and who lost reputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub task: TaskHash,
    pub accepted_label: Label,
    pub winners: Vec<WorkerId>,
    pub reward_per_worker: QuAmount,
    pub total_paid: QuAmount,
    pub penalized: Vec<WorkerId>,
}

/// The consensus core. Admits votes, detects quorum, and settles
/// rewards and reputation in a single all-or-nothing step.
///
/// The engine itself is stateless; every call threads the contract's
/// registry, task table, and pool through it, which keeps replay
/// deterministic.
#[derive(Debug, Clone)]
pub struct ConsensusEngine {
    params: ProtocolParams,
}

impl ConsensusEngine {
    pub fn new(params: ProtocolParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Records one vote and, when a label has reached quorum, attempts
    /// to resolve the task.
    ///
    /// A rejected vote leaves no trace: admission runs before any row is
    /// created. A vote that is admitted but whose resolution fails on
    /// pool coverage stays recorded, and the task remains open until a
    /// later vote retries the payout against a refilled pool.
    pub fn record_vote(
        &self,
        registry: &mut WorkerRegistry,
        tasks: &mut TaskTable,
        pool: &mut RewardPool,
        voter: WorkerId,
        task_hash: TaskHash,
        label: Label,
        now_tick: u64,
    ) -> Result<VoteOutcome> {
        self.check_admissible(registry, tasks, voter, task_hash)?;

        registry.get_or_create(voter)?;
        let entry = tasks.get_or_create(task_hash, now_tick)?;
        let tally = entry.record_vote(voter, label)?;
        debug!(task = %task_hash, label = %label, voter = %voter, tally, "🗳️ Vote recorded");

        if tally >= self.params.quorum as usize {
            entry.note_quorum(label);
        }
        let pending = entry.quorum_label().is_some();

        let resolution = if pending {
            self.try_resolve(registry, tasks, pool, task_hash)?
        } else {
            None
        };

        Ok(VoteOutcome {
            task: task_hash,
            label,
            tally,
            resolution,
        })
    }

    /// Marks every open task past its lifetime as expired.
    pub fn expire_overdue(&self, tasks: &mut TaskTable, now_tick: u64) -> Vec<TaskHash> {
        let expired = tasks.expire_overdue(now_tick, self.params.task_lifetime_ticks);
        if !expired.is_empty() {
            info!(count = expired.len(), now_tick, "⏳ Overdue tasks expired");
        }
        expired
    }

    /// Admission checks, in order: the task must be able to take the
    /// vote, then the registry must be able to hold the voter. Runs
    /// read-only so failures leave no partial rows behind.
    fn check_admissible(
        &self,
        registry: &WorkerRegistry,
        tasks: &TaskTable,
        voter: WorkerId,
        task_hash: TaskHash,
    ) -> Result<()> {
        match tasks.get(task_hash) {
            Some(task) => {
                match task.state() {
                    TaskState::Resolved => {
                        return Err(LabelError::TaskResolved { task: task_hash })
                    }
                    TaskState::Expired => return Err(LabelError::TaskExpired { task: task_hash }),
                    TaskState::Open => {}
                }
                if task.has_voted(voter) {
                    return Err(LabelError::DuplicateVote {
                        task: task_hash,
                        worker: voter,
                    });
                }
            }
            None => {
                if tasks.is_full() {
                    return Err(LabelError::TableFull {
                        capacity: tasks.capacity(),
                    });
                }
            }
        }
        if !registry.contains(voter) && registry.is_full() {
            return Err(LabelError::RegistryFull {
                capacity: registry.capacity(),
            });
        }
        Ok(())
    }

    /// Settles the pinned quorum label if the pool can cover the batch.
    ///
    /// Every check runs before any mutation: either the whole batch of
    /// credits, reputation changes, and the state transition applies, or
    /// none of it does.
    fn try_resolve(
        &self,
        registry: &mut WorkerRegistry,
        tasks: &mut TaskTable,
        pool: &mut RewardPool,
        task_hash: TaskHash,
    ) -> Result<Option<Resolution>> {
        let entry = match tasks.get_mut(task_hash) {
            Some(entry) => entry,
            None => return Ok(None),
        };
        if entry.state() != TaskState::Open {
            return Ok(None);
        }
        let candidate = match entry.quorum_label() {
            Some(label) => label,
            None => return Ok(None),
        };

        let winners = entry.voters(candidate);
        let minority = entry.minority_voters(candidate);
        let reward = self.params.reward_per_worker;

        // A batch total past QuAmount::MAX is unpayable by any pool.
        let required = match reward.checked_mul(winners.len() as u64) {
            Some(total) => total,
            None => {
                return Err(LabelError::InsufficientPool {
                    available: pool.available(),
                    required: QuAmount::MAX,
                })
            }
        };

        for w in &winners {
            let accrued = registry
                .get(*w)
                .map(|r| r.accrued)
                .unwrap_or(QuAmount::ZERO);
            if accrued.checked_add(reward).is_none() {
                return Err(LabelError::Overflow { worker: *w });
            }
        }

        if let Err(e) = pool.reserve(required) {
            warn!(
                task = %task_hash,
                label = %candidate,
                winners = winners.len(),
                available = %pool.available(),
                required = %required,
                "⚠️ Pool cannot cover payout, resolution deferred"
            );
            return Err(e);
        }

        for w in &winners {
            registry.credit(*w, reward)?;
            registry.reward_reputation(*w, self.params.reputation_reward);
        }
        for w in &minority {
            registry.penalize_reputation(*w, self.params.reputation_penalty);
        }
        entry.mark_resolved(candidate);

        info!(
            task = %task_hash,
            label = %candidate,
            winners = winners.len(),
            penalized = minority.len(),
            total_paid = %required,
            "🏁 Task resolved"
        );

        Ok(Some(Resolution {
            task: task_hash,
            accepted_label: candidate,
            winners,
            reward_per_worker: reward,
            total_paid: required,
            penalized: minority,
        }))
    }
}
