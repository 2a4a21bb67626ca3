use datalabel_consensus::{TaskTable, WorkerRegistry};
use datalabel_economics::RewardPool;
use datalabel_types::ProtocolParams;
use serde::{Deserialize, Serialize};

/// The contract's entire persistent state. Everything a validator
/// needs to replay is in here; ticks come in through calls and the
/// ledger stays outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    pub registry: WorkerRegistry,
    pub tasks: TaskTable,
    pub pool: RewardPool,
}

impl ContractState {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            registry: WorkerRegistry::new(params.max_workers),
            tasks: TaskTable::new(params.max_tasks),
            pool: RewardPool::new(),
        }
    }
}
