use datalabel_types::{LabelError, QuAmount, Result};
use serde::{Deserialize, Serialize};

/// Snapshot of the pool's accounting counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub available: QuAmount,
    pub committed: QuAmount,
    pub lifetime_funded: QuAmount,
    pub lifetime_claimed: QuAmount,
}

/// Funding pool that backs worker rewards.
///
/// `available` holds deposits not yet promised to anyone. When a task
/// resolves, the batch total moves to `committed`, which backs the
/// accrued balances workers can claim later. The two buckets always
/// reconcile against the lifetime counters:
///
/// `available + committed == lifetime_funded - lifetime_claimed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    available: QuAmount,
    committed: QuAmount,
    lifetime_funded: QuAmount,
    lifetime_claimed: QuAmount,
}

impl RewardPool {
    pub fn new() -> Self {
        Self {
            available: QuAmount::ZERO,
            committed: QuAmount::ZERO,
            lifetime_funded: QuAmount::ZERO,
            lifetime_claimed: QuAmount::ZERO,
        }
    }

    /// Adds an incoming deposit. Never fails; amounts past `QuAmount::MAX`
    /// saturate. Returns the new available balance.
    pub fn deposit(&mut self, amount: QuAmount) -> QuAmount {
        self.available = self.available.saturating_add(amount);
        self.lifetime_funded = self.lifetime_funded.saturating_add(amount);
        self.available
    }

    /// Moves `total` from available to committed, or fails without
    /// touching either bucket if the available balance cannot cover it.
    pub fn reserve(&mut self, total: QuAmount) -> Result<()> {
        let remaining = self
            .available
            .checked_sub(total)
            .ok_or(LabelError::InsufficientPool {
                available: self.available,
                required: total,
            })?;
        self.available = remaining;
        self.committed = self.committed.saturating_add(total);
        Ok(())
    }

    /// Releases committed backing once a claim has debited the worker's
    /// accrued balance. Callers debit first, so `amount` never exceeds
    /// the committed bucket.
    pub fn release_claim(&mut self, amount: QuAmount) {
        debug_assert!(
            amount <= self.committed,
            "claim released more than the committed backing"
        );
        self.committed = self.committed.saturating_sub(amount);
        self.lifetime_claimed = self.lifetime_claimed.saturating_add(amount);
    }

    pub fn available(&self) -> QuAmount {
        self.available
    }

    pub fn committed(&self) -> QuAmount {
        self.committed
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            available: self.available,
            committed: self.committed,
            lifetime_funded: self.lifetime_funded,
            lifetime_claimed: self.lifetime_claimed,
        }
    }
}

impl Default for RewardPool {
    fn default() -> Self {
        Self::new()
    }
}
