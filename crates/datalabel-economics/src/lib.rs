//! Economics for the labeling contract: the reward pool that backs
//! payouts and the adapter through which claims leave the contract.

pub mod ledger;
pub mod pool;

pub use ledger::{LedgerAdapter, MemoryLedger, TransferReceipt};
pub use pool::{PoolStats, RewardPool};
