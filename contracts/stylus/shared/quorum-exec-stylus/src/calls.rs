//! Outgoing calls made on behalf of a request.
//!
//! Nonces are spent before any callee runs, but the SDK keeps storage writes in a cache until the
//! entrypoint returns. A callee re-entering the contract would read the stored (unspent) values,
//! so every outgoing call writes the cache back first. A delegated callee runs as this contract
//! and may write its slots, so the cache is also dropped after it returns.

use alloc::vec::Vec;

use alloy_primitives::{Address, U256};
use quorum_exec_core::{ActionKind, CallError};
use stylus_sdk::call::RawCall;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CachePolicy {
    /// Write cached slots to storage before the call.
    Flush,
    /// Write cached slots before the call and re-read them afterwards.
    FlushAndClear,
}

pub fn cache_policy(kind: ActionKind) -> CachePolicy {
    match kind {
        ActionKind::ValueCall | ActionKind::ReadOnlyCall => CachePolicy::Flush,
        ActionKind::DelegatedCall => CachePolicy::FlushAndClear,
    }
}

/// Perform one call of `kind`. `value` is ignored for delegated and read-only calls.
///
/// A state change under STATICCALL reverts inside the callee and surfaces as
/// `CallError::Reverted`; the EVM does not tell the two apart.
pub fn raw_call(
    kind: ActionKind,
    target: Address,
    value: U256,
    payload: &[u8],
) -> Result<Vec<u8>, CallError> {
    let call = match kind {
        ActionKind::ValueCall => RawCall::new_with_value(value),
        ActionKind::DelegatedCall => RawCall::new_delegate(),
        ActionKind::ReadOnlyCall => RawCall::new_static(),
    };
    let call = match cache_policy(kind) {
        CachePolicy::Flush => call.flush_storage_cache(),
        CachePolicy::FlushAndClear => call.clear_storage_cache(),
    };
    unsafe { call.call(target, payload) }.map_err(|_| CallError::Reverted)
}
