use datalabel_types::{QuAmount, WorkerId};

/// Call environment supplied by the host for every invocation: who is
/// calling, how much currency the call carries, and the network tick
/// it executes at.
///
/// The caller identity is taken as authenticated by the host; the
/// contract never checks signatures itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: WorkerId,
    pub amount: QuAmount,
    pub tick: u64,
}

impl CallContext {
    pub fn new(caller: WorkerId, amount: QuAmount, tick: u64) -> Self {
        Self {
            caller,
            amount,
            tick,
        }
    }

    /// Context for a call with no attached transfer.
    pub fn bare(caller: WorkerId, tick: u64) -> Self {
        Self::new(caller, QuAmount::ZERO, tick)
    }
}
