//! Action dispatch against the live EVM.

use alloc::vec::Vec;

use alloy_primitives::{Address, U256};
use quorum_exec_core::{ActionHost, ActionKind, CallError, Environment};
use quorum_exec_stylus::raw_call;

/// Executes actions as the contract itself.
///
/// There is nothing to snapshot: an `execute` that returns an error reverts the whole
/// transaction, which discards every effect the actions had.
pub struct EvmHost {
    now: u64,
}

impl EvmHost {
    pub fn new(now: u64) -> Self {
        Self { now }
    }
}

impl Environment for EvmHost {
    type Checkpoint = ();

    fn block_timestamp(&self) -> u64 {
        self.now
    }

    fn checkpoint(&mut self) -> Self::Checkpoint {}

    fn revert_to(&mut self, _checkpoint: Self::Checkpoint) {}
}

impl ActionHost for EvmHost {
    fn call(&mut self, target: Address, value: U256, payload: &[u8]) -> Result<Vec<u8>, CallError> {
        raw_call(ActionKind::ValueCall, target, value, payload)
    }

    fn delegate_call(&mut self, target: Address, payload: &[u8]) -> Result<Vec<u8>, CallError> {
        raw_call(ActionKind::DelegatedCall, target, U256::ZERO, payload)
    }

    fn static_call(&mut self, target: Address, payload: &[u8]) -> Result<Vec<u8>, CallError> {
        raw_call(ActionKind::ReadOnlyCall, target, U256::ZERO, payload)
    }
}
