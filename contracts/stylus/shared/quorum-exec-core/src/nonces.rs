//! Per-signer replay counters.
//!
//! There is no "used" flag: a digest embeds the counter value it was signed against, and once the
//! counter moves past that value the digest can never be reconstructed again.

use alloc::collections::BTreeMap;

use alloy_primitives::{Address, U256};

pub trait NonceLedger {
    /// Current (next unused) counter for `signer`.
    fn nonce_of(&self, signer: Address) -> U256;

    /// Return the current counter and advance it by one.
    ///
    /// `None` once the counter is at `U256::MAX`; the counter is left where it is.
    fn consume(&mut self, signer: Address) -> Option<U256>;

    /// Put a counter back to a value `consume` previously returned.
    ///
    /// Only called by an executor discarding the effects of an aborted request.
    fn rewind(&mut self, signer: Address, nonce: U256);
}

/// In-memory ledger; every signer starts at zero.
#[derive(Clone, Debug, Default)]
pub struct MemoryNonces {
    counters: BTreeMap<Address, U256>,
}

impl MemoryNonces {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NonceLedger for MemoryNonces {
    fn nonce_of(&self, signer: Address) -> U256 {
        self.counters.get(&signer).copied().unwrap_or(U256::ZERO)
    }

    fn consume(&mut self, signer: Address) -> Option<U256> {
        let current = self.nonce_of(signer);
        let next = current.checked_add(U256::from(1u64))?;
        self.counters.insert(signer, next);
        Some(current)
    }

    fn rewind(&mut self, signer: Address, nonce: U256) {
        if nonce == U256::ZERO {
            self.counters.remove(&signer);
        } else {
            self.counters.insert(signer, nonce);
        }
    }
}
