use alloy::primitives::Address;

use crate::state::StateReader;

/// Execution context the host virtual machine hands to every call.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    /// Read-only view of execution-layer state.
    pub state: &'a dyn StateReader,
    /// Chain id of the executing chain, bound into every user operation hash.
    pub chain_id: u64,
    /// Timestamp of the block being executed.
    pub timestamp: u64,
    /// Address of the contract calling the precompile.
    pub caller: Address,
}

impl<'a> CallContext<'a> {
    /// Creates a context at timestamp `0` with a zero caller.
    pub fn new(state: &'a dyn StateReader, chain_id: u64) -> Self {
        Self { state, chain_id, timestamp: 0, caller: Address::ZERO }
    }

    /// Sets the block timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the calling contract.
    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = caller;
        self
    }
}
