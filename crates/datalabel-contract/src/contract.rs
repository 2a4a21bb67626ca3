use crate::call::CallContext;
use crate::state::ContractState;
use datalabel_consensus::{ConsensusEngine, TaskConsensus, VoteOutcome, WorkerRecord};
use datalabel_economics::{LedgerAdapter, PoolStats, TransferReceipt};
use datalabel_types::{Label, LabelError, ProtocolParams, QuAmount, Result, TaskHash, WorkerId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// The labeling contract's call surface.
///
/// One write lock around the whole state serializes calls, which is
/// what gives each invocation its atomicity: a call either commits all
/// of its effects or none of them. The ledger adapter lives outside
/// that boundary and is only touched after the state has committed.
pub struct LabelContract {
    engine: ConsensusEngine,
    state: RwLock<ContractState>,
    ledger: Arc<dyn LedgerAdapter>,
}

impl LabelContract {
    pub fn new(params: ProtocolParams, ledger: Arc<dyn LedgerAdapter>) -> Self {
        let state = ContractState::new(&params);
        Self {
            engine: ConsensusEngine::new(params),
            state: RwLock::new(state),
            ledger,
        }
    }

    /// Restores a contract around previously persisted state.
    pub fn from_state(
        params: ProtocolParams,
        state: ContractState,
        ledger: Arc<dyn LedgerAdapter>,
    ) -> Self {
        Self {
            engine: ConsensusEngine::new(params),
            state: RwLock::new(state),
            ledger,
        }
    }

    pub fn params(&self) -> &ProtocolParams {
        self.engine.params()
    }

    /// Deposits the call's attached amount into the reward pool.
    /// Anyone may fund; the deposit cannot fail. Returns the pool's new
    /// available balance.
    pub async fn fund(&self, ctx: &CallContext) -> QuAmount {
        let mut state = self.state.write().await;
        let available = state.pool.deposit(ctx.amount);
        info!(
            from = %ctx.caller,
            amount = %ctx.amount,
            pool_available = %available,
            "💰 Pool funded"
        );
        available
    }

    /// Submits the caller's vote for `label` on `task`. First contact
    /// registers the worker; the third identical vote resolves the task
    /// and settles rewards.
    pub async fn submit_label(
        &self,
        ctx: &CallContext,
        task: TaskHash,
        label: Label,
    ) -> Result<VoteOutcome> {
        let mut state = self.state.write().await;
        let ContractState {
            registry,
            tasks,
            pool,
        } = &mut *state;
        self.engine
            .record_vote(registry, tasks, pool, ctx.caller, task, label, ctx.tick)
    }

    /// Pays out the caller's entire accrued balance through the ledger.
    ///
    /// The debit commits before the transfer is attempted, so a ledger
    /// failure can never lead to a double payout. If the transfer does
    /// fail, the error carries the amount and the incident is logged
    /// for operator settlement.
    pub async fn claim_payout(&self, ctx: &CallContext) -> Result<TransferReceipt> {
        let worker = ctx.caller;
        let amount = {
            let mut state = self.state.write().await;
            let accrued = state
                .registry
                .get(worker)
                .map(|r| r.accrued)
                .unwrap_or(QuAmount::ZERO);
            if accrued.is_zero() {
                return Err(LabelError::NothingToClaim { worker });
            }
            state.registry.debit(worker, accrued)?;
            state.pool.release_claim(accrued);
            accrued
        };

        match self.ledger.send(worker, amount).await {
            Ok(receipt) => {
                info!(
                    worker = %worker,
                    amount = %amount,
                    tx_id = %receipt.tx_id,
                    "💸 Payout claimed"
                );
                Ok(receipt)
            }
            Err(e) => {
                error!(
                    worker = %worker,
                    amount = %amount,
                    error = %e,
                    "❌ Ledger transfer failed after debit"
                );
                Err(LabelError::TransferFailed {
                    worker,
                    amount,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Expires every open task whose lifetime has elapsed at `now_tick`
    /// and returns their hashes. Safe to call from any scheduler; a
    /// quiet sweep returns an empty list.
    pub async fn expire_tasks(&self, now_tick: u64) -> Vec<TaskHash> {
        let mut state = self.state.write().await;
        self.engine.expire_overdue(&mut state.tasks, now_tick)
    }

    pub async fn worker(&self, id: WorkerId) -> Option<WorkerRecord> {
        self.state.read().await.registry.get(id).copied()
    }

    pub async fn task(&self, hash: TaskHash) -> Option<TaskConsensus> {
        self.state.read().await.tasks.get(hash).cloned()
    }

    pub async fn pool_stats(&self) -> PoolStats {
        self.state.read().await.pool.stats()
    }

    /// Owned copy of the full state, for persistence or inspection.
    pub async fn snapshot(&self) -> ContractState {
        self.state.read().await.clone()
    }
}
