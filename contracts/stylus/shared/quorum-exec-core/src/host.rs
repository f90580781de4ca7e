//! Execution environment seams.
//!
//! On-chain the EVM provides the encompassing transaction, so checkpoints are free and a failing
//! call reverts everything. Off-chain hosts snapshot their own world state instead.

use alloc::vec::Vec;

use alloy_primitives::{Address, U256};

use crate::{errors::CallError, types::{Action, ActionKind}};

pub trait Environment {
    type Checkpoint;

    fn block_timestamp(&self) -> u64;

    /// Mark the start of a request's effects.
    fn checkpoint(&mut self) -> Self::Checkpoint;

    /// Discard every effect recorded since `checkpoint`.
    fn revert_to(&mut self, checkpoint: Self::Checkpoint);
}

/// Call primitives used to execute batch actions, always on behalf of the engine's identity.
pub trait ActionHost: Environment {
    fn call(&mut self, target: Address, value: U256, payload: &[u8]) -> Result<Vec<u8>, CallError>;

    /// Runs `target`'s code against the engine's own state.
    fn delegate_call(&mut self, target: Address, payload: &[u8]) -> Result<Vec<u8>, CallError>;

    /// The host, not the engine, rejects any mutation attempted by the target.
    fn static_call(&mut self, target: Address, payload: &[u8]) -> Result<Vec<u8>, CallError>;
}

/// Asset-transfer primitive used by the two-party swap.
pub trait TokenHost: Environment {
    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CallError>;
}

/// Route an action to the host primitive for its kind.
pub fn dispatch<H: ActionHost + ?Sized>(host: &mut H, action: &Action) -> Result<Vec<u8>, CallError> {
    match action.kind {
        ActionKind::ValueCall => host.call(action.target, action.value, &action.payload),
        ActionKind::DelegatedCall => host.delegate_call(action.target, &action.payload),
        ActionKind::ReadOnlyCall => host.static_call(action.target, &action.payload),
    }
}
