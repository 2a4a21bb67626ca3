//! On-chain consensus and reward distribution for crowd-sourced data
//! labeling.
//!
//! Workers vote on the label of a task; three identical votes resolve
//! it, pay each majority voter a flat reward from a community-funded
//! pool, and adjust reputations. Workers later claim their accrued
//! balance as a single transfer through the hosting ledger.
//!
//! [`LabelContract`] is the call surface. State transitions are pure
//! functions of the call sequence, so validators replaying the same
//! calls reach the same state byte for byte.

pub mod call;
pub mod config;
pub mod contract;
pub mod state;

pub use call::CallContext;
pub use config::ContractConfig;
pub use contract::LabelContract;
pub use state::ContractState;
