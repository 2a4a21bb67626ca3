use datalabel_types::{LabelError, QuAmount, Result, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reputation ceiling. Scores live in `0..=MAX_REPUTATION`.
pub const MAX_REPUTATION: u8 = 100;

/// Per-worker standing: reputation earned through resolutions and the
/// reward balance accrued but not yet claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub reputation: u8,
    pub accrued: QuAmount,
}

impl WorkerRecord {
    fn new() -> Self {
        Self {
            reputation: 0,
            accrued: QuAmount::ZERO,
        }
    }
}

/// Bounded table of every worker the contract has ever seen.
///
/// Records are created lazily on a worker's first vote and are never
/// deleted, so the capacity bound is a lifetime limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRegistry {
    capacity: usize,
    workers: BTreeMap<WorkerId, WorkerRecord>,
}

impl WorkerRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            workers: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.workers.len() >= self.capacity
    }

    pub fn contains(&self, id: WorkerId) -> bool {
        self.workers.contains_key(&id)
    }

    pub fn get(&self, id: WorkerId) -> Option<&WorkerRecord> {
        self.workers.get(&id)
    }

    /// Returns the existing record for `id`, or creates a fresh one with
    /// zero reputation and zero accrued balance. Fails when the registry
    /// is full and `id` is unknown.
    pub fn get_or_create(&mut self, id: WorkerId) -> Result<&mut WorkerRecord> {
        if !self.workers.contains_key(&id) && self.is_full() {
            return Err(LabelError::RegistryFull {
                capacity: self.capacity,
            });
        }
        Ok(self.workers.entry(id).or_insert_with(WorkerRecord::new))
    }

    /// Adds `amount` to a worker's accrued balance. Returns the updated
    /// balance, or `Overflow` if it would exceed `QuAmount::MAX`.
    pub fn credit(&mut self, id: WorkerId, amount: QuAmount) -> Result<QuAmount> {
        let record = self.get_or_create(id)?;
        let updated = record
            .accrued
            .checked_add(amount)
            .ok_or(LabelError::Overflow { worker: id })?;
        record.accrued = updated;
        Ok(updated)
    }

    /// Removes `amount` from a worker's accrued balance. A worker the
    /// registry has never seen holds nothing, so the debit fails the
    /// same way an overdraw does. Returns the remaining balance.
    pub fn debit(&mut self, id: WorkerId, amount: QuAmount) -> Result<QuAmount> {
        let available = self
            .workers
            .get(&id)
            .map(|r| r.accrued)
            .unwrap_or(QuAmount::ZERO);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LabelError::InsufficientBalance {
                worker: id,
                available,
                requested: amount,
            })?;
        if let Some(record) = self.workers.get_mut(&id) {
            record.accrued = remaining;
        }
        Ok(remaining)
    }

    /// Raises a worker's reputation, saturating at `MAX_REPUTATION`.
    /// Returns the new score. Unknown workers are left untouched.
    pub fn reward_reputation(&mut self, id: WorkerId, delta: u8) -> u8 {
        match self.workers.get_mut(&id) {
            Some(record) => {
                record.reputation = record.reputation.saturating_add(delta).min(MAX_REPUTATION);
                record.reputation
            }
            None => 0,
        }
    }

    /// Lowers a worker's reputation, flooring at zero. Returns the new
    /// score. Unknown workers are left untouched.
    pub fn penalize_reputation(&mut self, id: WorkerId, delta: u8) -> u8 {
        match self.workers.get_mut(&id) {
            Some(record) => {
                record.reputation = record.reputation.saturating_sub(delta);
                record.reputation
            }
            None => 0,
        }
    }

    /// Sum of every accrued balance. Saturates rather than overflows, so
    /// it is accurate whenever the total fits in a `QuAmount`.
    pub fn total_accrued(&self) -> QuAmount {
        self.workers
            .values()
            .fold(QuAmount::ZERO, |acc, r| acc.saturating_add(r.accrued))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WorkerId, &WorkerRecord)> {
        self.workers.iter()
    }
}
