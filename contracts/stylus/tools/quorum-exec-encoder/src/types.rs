//! JSON request files handed to off-chain signers.
//!
//! A file carries everything a signer needs to rebuild the digest independently: the domain,
//! the request content and the nonce snapshot read from the contract.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use anyhow::{ensure, Result};
use quorum_exec_core::{
    encoder::{encode_request, encode_swap},
    Action, ActionKind, AuthorizationRequest, Domain, SwapOffer,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainFile {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl From<&DomainFile> for Domain {
    fn from(file: &DomainFile) -> Self {
        Domain::new(file.name.clone(), file.version.clone(), file.chain_id, file.verifying_contract)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKindFile {
    ValueCall,
    DelegatedCall,
    ReadOnlyCall,
}

impl From<ActionKindFile> for ActionKind {
    fn from(kind: ActionKindFile) -> Self {
        match kind {
            ActionKindFile::ValueCall => ActionKind::ValueCall,
            ActionKindFile::DelegatedCall => ActionKind::DelegatedCall,
            ActionKindFile::ReadOnlyCall => ActionKind::ReadOnlyCall,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionFile {
    pub kind: ActionKindFile,
    pub target: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub payload: Bytes,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFile {
    pub domain: DomainFile,
    pub actions: Vec<ActionFile>,
    pub signers: Vec<Address>,
    /// `nonceOf(signer)` for each signer, read just before signing.
    pub nonces: Vec<U256>,
    pub deadline: u64,
}

impl BatchFile {
    pub fn request(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            actions: self
                .actions
                .iter()
                .map(|a| Action {
                    kind: a.kind.into(),
                    target: a.target,
                    value: a.value,
                    payload: a.payload.to_vec(),
                })
                .collect(),
            signers: self.signers.clone(),
            deadline: self.deadline,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapFile {
    pub domain: DomainFile,
    pub owner_a: Address,
    pub owner_b: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub value_a: U256,
    pub value_b: U256,
    pub nonce_a: U256,
    pub nonce_b: U256,
    pub deadline: u64,
}

impl SwapFile {
    pub fn offer(&self) -> SwapOffer {
        SwapOffer {
            owner_a: self.owner_a,
            owner_b: self.owner_b,
            token_a: self.token_a,
            token_b: self.token_b,
            value_a: self.value_a,
            value_b: self.value_b,
            nonce_a: self.nonce_a,
            nonce_b: self.nonce_b,
            deadline: self.deadline,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestFile {
    Batch(BatchFile),
    Swap(SwapFile),
}

impl RequestFile {
    pub fn domain(&self) -> Domain {
        match self {
            RequestFile::Batch(batch) => (&batch.domain).into(),
            RequestFile::Swap(swap) => (&swap.domain).into(),
        }
    }

    /// Struct preimage, byte-identical to what the contract hashes.
    pub fn preimage(&self) -> Result<Vec<u8>> {
        match self {
            RequestFile::Batch(batch) => {
                ensure!(
                    batch.nonces.len() == batch.signers.len(),
                    "nonce snapshot has {} entries for {} signers",
                    batch.nonces.len(),
                    batch.signers.len()
                );
                let request = batch.request();
                Ok(encode_request(&request.actions, &request.signers, &batch.nonces, request.deadline))
            }
            RequestFile::Swap(swap) => Ok(encode_swap(&swap.offer())),
        }
    }

    pub fn struct_hash(&self) -> Result<B256> {
        Ok(keccak256(self.preimage()?))
    }

    pub fn digest(&self) -> Result<B256> {
        Ok(self.domain().digest(self.struct_hash()?))
    }
}
