//! Per-signer counters held in a contract's `mapping(address => uint256)`.

use alloy_primitives::{Address, U256};
use quorum_exec_core::NonceLedger;
use stylus_sdk::storage::{StorageMap, StorageU256};

pub struct StorageNonces<'a> {
    counters: &'a mut StorageMap<Address, StorageU256>,
}

impl<'a> StorageNonces<'a> {
    pub fn new(counters: &'a mut StorageMap<Address, StorageU256>) -> Self {
        Self { counters }
    }
}

impl NonceLedger for StorageNonces<'_> {
    fn nonce_of(&self, signer: Address) -> U256 {
        self.counters.get(signer)
    }

    fn consume(&mut self, signer: Address) -> Option<U256> {
        let current = self.counters.get(signer);
        let next = current.checked_add(U256::from(1u64))?;
        self.counters.insert(signer, next);
        Some(current)
    }

    fn rewind(&mut self, signer: Address, nonce: U256) {
        self.counters.insert(signer, nonce);
    }
}
