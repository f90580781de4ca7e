//! Construction-time configuration of the batch engine.

use alloc::{string::String, vec::Vec};

use alloy_primitives::Address;

use crate::{
    encoder::Domain,
    errors::ConfigError,
    executor::BatchExecutor,
    membership::QuorumPolicy,
    nonces::MemoryNonces,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub domain_name: String,
    pub domain_version: String,
    pub members: Vec<Address>,
    pub quorum: usize,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<QuorumPolicy, ConfigError> {
        QuorumPolicy::new(self.members.iter().copied(), self.quorum)
    }

    pub fn domain(&self, chain_id: u64, verifying_contract: Address) -> Domain {
        Domain::new(
            self.domain_name.clone(),
            self.domain_version.clone(),
            chain_id,
            verifying_contract,
        )
    }

    /// Build an in-memory engine deployed at `verifying_contract` on `chain_id`.
    pub fn build(
        &self,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Result<BatchExecutor<QuorumPolicy, MemoryNonces>, ConfigError> {
        let policy = self.validate()?;
        Ok(BatchExecutor::new(
            self.domain(chain_id, verifying_contract),
            policy,
            MemoryNonces::new(),
        ))
    }
}
