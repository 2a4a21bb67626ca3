//! Consensus for the labeling contract: the worker registry, per-task
//! vote tallies, and the engine that turns a quorum into payouts.

pub mod engine;
pub mod registry;
pub mod tally;

pub use engine::{ConsensusEngine, Resolution, VoteOutcome};
pub use registry::{WorkerRecord, WorkerRegistry, MAX_REPUTATION};
pub use tally::{TaskConsensus, TaskState, TaskTable};
