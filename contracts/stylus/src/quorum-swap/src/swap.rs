//! Swap contract: one signed offer, two `transferFrom` legs.

use alloc::string::String;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::sol;
use quorum_exec_core::{
    encoder::{encode_swap, hash_swap},
    Domain, SwapEngine, SwapOffer, SwapTerms,
};
use quorum_exec_stylus::{PrecompileRecovery, StorageNonces};
use stylus_sdk::{abi::Bytes, prelude::*, stylus_core::log};

use crate::{errors::SwapError, host::TokenCaller};

sol! {
    event SwapSettled(bytes32 indexed digest, address indexed ownerA, address indexed ownerB);
}

sol_storage! {
    #[entrypoint]
    pub struct QuorumSwap {
        /// Next unused nonce per owner.
        mapping(address => uint256) nonces;

        string domain_name;
        string domain_version;
    }
}

#[public]
impl QuorumSwap {
    #[constructor]
    pub fn constructor(&mut self, domain_name: String, domain_version: String) {
        self.domain_name.set_str(&domain_name);
        self.domain_version.set_str(&domain_version);
    }

    /// Exchange `valueA` of `tokenA` held by `ownerA` for `valueB` of `tokenB` held by `ownerB`.
    ///
    /// Both signatures cover the offer with the owners' current nonces. When `ownerA == ownerB`
    /// the offer carries two consecutive nonces of that owner.
    #[allow(clippy::too_many_arguments)]
    pub fn swap(
        &mut self,
        owner_a: Address,
        owner_b: Address,
        token_a: Address,
        token_b: Address,
        value_a: U256,
        value_b: U256,
        deadline: u64,
        sig_a: Bytes,
        sig_b: Bytes,
    ) -> Result<(), SwapError> {
        let terms = SwapTerms {
            owner_a,
            owner_b,
            token_a,
            token_b,
            value_a,
            value_b,
            deadline,
        };
        let domain = self.domain();
        let mut host = TokenCaller::new(self.vm().block_timestamp());
        let mut engine = SwapEngine::new(domain, StorageNonces::new(&mut self.nonces));
        let offer = engine.swap(&mut host, &PrecompileRecovery, &terms, &sig_a.0, &sig_b.0)?;
        let digest = engine.offer_digest(&offer);

        log(
            self.vm(),
            SwapSettled {
                digest,
                ownerA: owner_a,
                ownerB: owner_b,
            },
        );
        Ok(())
    }

    pub fn nonce_of(&self, owner: Address) -> U256 {
        self.nonces.get(owner)
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain().separator()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn encode_swap_digest_preimage(
        &self,
        owner_a: Address,
        owner_b: Address,
        token_a: Address,
        token_b: Address,
        value_a: U256,
        value_b: U256,
        nonce_a: U256,
        nonce_b: U256,
        deadline: u64,
    ) -> Bytes {
        Bytes(encode_swap(&SwapOffer {
            owner_a,
            owner_b,
            token_a,
            token_b,
            value_a,
            value_b,
            nonce_a,
            nonce_b,
            deadline,
        }))
    }

    /// Digest both owners sign, for an explicit pair of nonces.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_digest(
        &self,
        owner_a: Address,
        owner_b: Address,
        token_a: Address,
        token_b: Address,
        value_a: U256,
        value_b: U256,
        nonce_a: U256,
        nonce_b: U256,
        deadline: u64,
    ) -> B256 {
        let offer = SwapOffer {
            owner_a,
            owner_b,
            token_a,
            token_b,
            value_a,
            value_b,
            nonce_a,
            nonce_b,
            deadline,
        };
        self.domain().digest(hash_swap(&offer))
    }
}

impl QuorumSwap {
    fn domain(&self) -> Domain {
        Domain::new(
            self.domain_name.get_string(),
            self.domain_version.get_string(),
            self.vm().chain_id(),
            self.vm().contract_address(),
        )
    }
}
