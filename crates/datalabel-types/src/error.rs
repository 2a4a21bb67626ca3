use crate::{QuAmount, TaskHash, WorkerId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("worker registry full: capacity {capacity}")]
    RegistryFull { capacity: usize },

    #[error("task table full: capacity {capacity}")]
    TableFull { capacity: usize },

    #[error("task {task} already resolved")]
    TaskResolved { task: TaskHash },

    #[error("task {task} expired")]
    TaskExpired { task: TaskHash },

    #[error("worker {worker} already voted on task {task}")]
    DuplicateVote { task: TaskHash, worker: WorkerId },

    #[error("balance overflow for worker {worker}")]
    Overflow { worker: WorkerId },

    #[error("insufficient balance for worker {worker}: has {available}, needs {requested}")]
    InsufficientBalance {
        worker: WorkerId,
        available: QuAmount,
        requested: QuAmount,
    },

    /// The pool cannot cover a full payout batch. The vote that triggered
    /// the resolution attempt stays recorded; no balance moves. This is
    /// the one error a `submit_label` caller sees after a state change.
    #[error("insufficient pool: available {available}, payout requires {required}")]
    InsufficientPool {
        available: QuAmount,
        required: QuAmount,
    },

    #[error("nothing to claim for worker {worker}")]
    NothingToClaim { worker: WorkerId },

    /// The external ledger rejected a transfer after the worker's accrued
    /// balance was already debited. The debit is authoritative; retrying
    /// the claim must not debit again.
    #[error("ledger transfer of {amount} to {worker} failed after debit: {reason}")]
    TransferFailed {
        worker: WorkerId,
        amount: QuAmount,
        reason: String,
    },
}

/// Coarse classification of failures so a client can decide whether a
/// resubmission can ever succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A bounded table rejected a new entry; retry only helps once policy
    /// frees a slot.
    CapacityExceeded,
    /// The vote itself is not admissible; resubmitting the same vote will
    /// fail the same way.
    InvalidVote,
    /// A balance or pool check failed; retry after funding may succeed.
    Arithmetic,
    /// Informational: the caller has no accrued balance.
    NothingToClaim,
    /// The external ledger misbehaved; requires operator attention.
    Ledger,
}

impl LabelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LabelError::RegistryFull { .. } | LabelError::TableFull { .. } => {
                ErrorKind::CapacityExceeded
            }
            LabelError::TaskResolved { .. }
            | LabelError::TaskExpired { .. }
            | LabelError::DuplicateVote { .. } => ErrorKind::InvalidVote,
            LabelError::Overflow { .. }
            | LabelError::InsufficientBalance { .. }
            | LabelError::InsufficientPool { .. } => ErrorKind::Arithmetic,
            LabelError::NothingToClaim { .. } => ErrorKind::NothingToClaim,
            LabelError::TransferFailed { .. } => ErrorKind::Ledger,
        }
    }
}

pub type Result<T> = std::result::Result<T, LabelError>;
