use datalabel_types::{Label, LabelError, Result, TaskHash, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Lifecycle of a task's consensus entry. `Resolved` and `Expired` are
/// terminal; no vote is ever accepted in either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Open,
    Resolved,
    Expired,
}

/// Vote tally and resolution state for a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConsensus {
    task: TaskHash,
    created_at_tick: u64,
    state: TaskState,
    accepted_label: Option<Label>,
    /// First label whose tally reached quorum. Resolution only ever
    /// targets this label, even when the payout is deferred and other
    /// labels reach quorum in the meantime.
    quorum_label: Option<Label>,
    votes: BTreeMap<Label, BTreeSet<WorkerId>>,
}

impl TaskConsensus {
    fn new(task: TaskHash, created_at_tick: u64) -> Self {
        Self {
            task,
            created_at_tick,
            state: TaskState::Open,
            accepted_label: None,
            quorum_label: None,
            votes: BTreeMap::new(),
        }
    }

    pub fn task_hash(&self) -> TaskHash {
        self.task
    }

    pub fn created_at_tick(&self) -> u64 {
        self.created_at_tick
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn accepted_label(&self) -> Option<Label> {
        self.accepted_label
    }

    pub fn quorum_label(&self) -> Option<Label> {
        self.quorum_label
    }

    /// Number of votes recorded for `label`.
    pub fn tally(&self, label: Label) -> usize {
        self.votes.get(&label).map(BTreeSet::len).unwrap_or(0)
    }

    /// Vote counts for every label seen so far.
    pub fn tallies(&self) -> BTreeMap<Label, usize> {
        self.votes
            .iter()
            .map(|(label, voters)| (*label, voters.len()))
            .collect()
    }

    pub fn total_votes(&self) -> usize {
        self.votes.values().map(BTreeSet::len).sum()
    }

    /// The label `worker` voted for, if any.
    pub fn voted_label(&self, worker: WorkerId) -> Option<Label> {
        self.votes
            .iter()
            .find(|(_, voters)| voters.contains(&worker))
            .map(|(label, _)| *label)
    }

    pub fn has_voted(&self, worker: WorkerId) -> bool {
        self.voted_label(worker).is_some()
    }

    /// Everyone who voted for `label`, in id order.
    pub fn voters(&self, label: Label) -> Vec<WorkerId> {
        self.votes
            .get(&label)
            .map(|voters| voters.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Everyone who voted for a label other than `winning`, in id order.
    pub fn minority_voters(&self, winning: Label) -> Vec<WorkerId> {
        self.votes
            .iter()
            .filter(|(label, _)| **label != winning)
            .flat_map(|(_, voters)| voters.iter().copied())
            .collect()
    }

    pub fn is_overdue(&self, now_tick: u64, lifetime_ticks: u64) -> bool {
        self.state == TaskState::Open
            && now_tick.saturating_sub(self.created_at_tick) > lifetime_ticks
    }

    pub(crate) fn record_vote(&mut self, worker: WorkerId, label: Label) -> Result<usize> {
        match self.state {
            TaskState::Resolved => return Err(LabelError::TaskResolved { task: self.task }),
            TaskState::Expired => return Err(LabelError::TaskExpired { task: self.task }),
            TaskState::Open => {}
        }
        if self.has_voted(worker) {
            return Err(LabelError::DuplicateVote {
                task: self.task,
                worker,
            });
        }
        let voters = self.votes.entry(label).or_default();
        voters.insert(worker);
        Ok(voters.len())
    }

    /// Pins the resolution candidate. First caller wins; later quorums
    /// on other labels do not displace it.
    pub(crate) fn note_quorum(&mut self, label: Label) {
        if self.quorum_label.is_none() {
            self.quorum_label = Some(label);
        }
    }

    pub(crate) fn mark_resolved(&mut self, label: Label) {
        self.state = TaskState::Resolved;
        self.accepted_label = Some(label);
    }

    pub(crate) fn mark_expired(&mut self) {
        self.state = TaskState::Expired;
    }
}

/// Bounded table of tasks under consensus, keyed by task hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTable {
    capacity: usize,
    tasks: BTreeMap<TaskHash, TaskConsensus>,
}

impl TaskTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tasks: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tasks.len() >= self.capacity
    }

    pub fn get(&self, hash: TaskHash) -> Option<&TaskConsensus> {
        self.tasks.get(&hash)
    }

    pub(crate) fn get_mut(&mut self, hash: TaskHash) -> Option<&mut TaskConsensus> {
        self.tasks.get_mut(&hash)
    }

    /// Returns the entry for `hash`, creating it at `now_tick` on first
    /// sight. Fails when the table is full and `hash` is unknown.
    /// Terminal entries are kept, so a full table only turns over on
    /// redeployment.
    pub fn get_or_create(&mut self, hash: TaskHash, now_tick: u64) -> Result<&mut TaskConsensus> {
        if !self.tasks.contains_key(&hash) && self.is_full() {
            return Err(LabelError::TableFull {
                capacity: self.capacity,
            });
        }
        Ok(self
            .tasks
            .entry(hash)
            .or_insert_with(|| TaskConsensus::new(hash, now_tick)))
    }

    /// Marks every open task past its lifetime as expired and returns
    /// the hashes that changed state.
    pub(crate) fn expire_overdue(&mut self, now_tick: u64, lifetime_ticks: u64) -> Vec<TaskHash> {
        let mut expired = Vec::new();
        for (hash, task) in self.tasks.iter_mut() {
            if task.is_overdue(now_tick, lifetime_ticks) {
                task.mark_expired();
                expired.push(*hash);
            }
        }
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskHash, &TaskConsensus)> {
        self.tasks.iter()
    }
}
