//! Quorum executor contract.
//!
//! Membership and quorum are fixed by the constructor. Per-signer nonces are the only state that
//! `execute` writes; everything else it changes is changed by the actions themselves, executed
//! with this contract as the caller (or, for delegated actions, as this contract's code).

use alloc::{string::String, vec::Vec};

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::sol;
use quorum_exec_core::{
    encoder::{encode_request, hash_request},
    Action, ActionKind, AuthorizationRequest, BatchExecutor, Domain,
    EngineConfig, Signature,
};
use quorum_exec_stylus::{PrecompileRecovery, StorageNonces};
use stylus_sdk::{abi::Bytes, prelude::*, stylus_core::log};

use crate::{
    errors::{ExecutorError, UnknownActionKind},
    host::EvmHost,
    storage::StorageMembers,
};

/// ABI shape of an action: `(uint8 kind, address target, uint256 value, bytes payload)`.
pub type ActionTuple = (u8, Address, U256, Bytes);

sol! {
    event RequestExecuted(bytes32 indexed digest, address indexed relayer, uint256 actions);
}

sol_storage! {
    #[entrypoint]
    pub struct QuorumExecutor {
        /// Next unused nonce per signer.
        mapping(address => uint256) nonces;

        mapping(address => bool) member_set;
        /// Same members as `member_set`, ascending, for enumeration.
        address[] member_list;
        uint256 quorum_size;

        string domain_name;
        string domain_version;
    }
}

#[public]
impl QuorumExecutor {
    /// Reverts with `InvalidConfiguration` unless members are non-zero and distinct and
    /// `1 <= quorum <= members.len()`.
    #[constructor]
    pub fn constructor(
        &mut self,
        domain_name: String,
        domain_version: String,
        members: Vec<Address>,
        quorum: U256,
    ) -> Result<(), ExecutorError> {
        let config = EngineConfig {
            domain_name,
            domain_version,
            members,
            quorum: quorum.saturating_to::<usize>(),
        };
        let policy = config.validate()?;

        for member in policy.members() {
            self.member_set.insert(*member, true);
            self.member_list.push(*member);
        }
        self.quorum_size.set(U256::from(config.quorum));
        self.domain_name.set_str(&config.domain_name);
        self.domain_version.set_str(&config.domain_version);
        Ok(())
    }

    /// Authorise and run an action list.
    ///
    /// `signers` must be strictly ascending members, with `signatures[i]` produced by
    /// `signers[i]` over `requestDigest(actions, signers, nonces, deadline)` where `nonces` is
    /// each signer's current `nonceOf`. Any ether sent is available to the actions.
    #[payable]
    pub fn execute(
        &mut self,
        actions: Vec<ActionTuple>,
        signers: Vec<Address>,
        deadline: u64,
        signatures: Vec<Bytes>,
    ) -> Result<(), ExecutorError> {
        let request = AuthorizationRequest {
            actions: decode_actions(actions)?,
            signers,
            deadline,
        };
        let signatures: Vec<Signature> = signatures.into_iter().map(|s| s.0).collect();

        let domain = self.domain();
        let mut host = EvmHost::new(self.vm().block_timestamp());
        let quorum = self.quorum_size.get().saturating_to::<usize>();
        let mut executor = BatchExecutor::new(
            domain,
            StorageMembers::new(&self.member_set, quorum),
            StorageNonces::new(&mut self.nonces),
        );
        let execution = executor.run(&mut host, &PrecompileRecovery, &request, &signatures)?;

        log(
            self.vm(),
            RequestExecuted {
                digest: execution.digest,
                relayer: self.vm().msg_sender(),
                actions: U256::from(request.actions.len()),
            },
        );
        Ok(())
    }

    pub fn nonce_of(&self, signer: Address) -> U256 {
        self.nonces.get(signer)
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain().separator()
    }

    /// The 160-byte struct preimage whose hash is placed under the domain separator.
    pub fn encode_request_digest_preimage(
        &self,
        actions: Vec<ActionTuple>,
        signers: Vec<Address>,
        nonces: Vec<U256>,
        deadline: u64,
    ) -> Result<Bytes, ExecutorError> {
        let actions = decode_actions(actions)?;
        Ok(Bytes(encode_request(&actions, &signers, &nonces, deadline)))
    }

    /// Digest each signer signs, for an explicit nonce snapshot.
    pub fn request_digest(
        &self,
        actions: Vec<ActionTuple>,
        signers: Vec<Address>,
        nonces: Vec<U256>,
        deadline: u64,
    ) -> Result<B256, ExecutorError> {
        let actions = decode_actions(actions)?;
        Ok(self
            .domain()
            .digest(hash_request(&actions, &signers, &nonces, deadline)))
    }

    pub fn quorum(&self) -> U256 {
        self.quorum_size.get()
    }

    pub fn members(&self) -> Vec<Address> {
        let mut out = Vec::with_capacity(self.member_list.len());
        for i in 0..self.member_list.len() {
            if let Some(member) = self.member_list.get(i) {
                out.push(member);
            }
        }
        out
    }

    pub fn is_member(&self, who: Address) -> bool {
        self.member_set.get(who)
    }
}

impl QuorumExecutor {
    fn domain(&self) -> Domain {
        Domain::new(
            self.domain_name.get_string(),
            self.domain_version.get_string(),
            self.vm().chain_id(),
            self.vm().contract_address(),
        )
    }
}

fn decode_actions(actions: Vec<ActionTuple>) -> Result<Vec<Action>, ExecutorError> {
    actions
        .into_iter()
        .enumerate()
        .map(|(index, (kind, target, value, payload))| {
            let kind = ActionKind::try_from(kind).map_err(|_| {
                ExecutorError::UnknownActionKind(UnknownActionKind {
                    index: U256::from(index),
                    kind,
                })
            })?;
            Ok(Action {
                kind,
                target,
                value,
                payload: payload.0,
            })
        })
        .collect()
}
