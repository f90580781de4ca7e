//! Domain-separated structured digests (EIP-712 layout).
//!
//! Variable-length content (payloads, action lists, signer and nonce lists) is always hashed to a
//! single word before it is placed in an enclosing struct, so every preimage built here has a
//! fixed shape.

use alloc::{string::String, vec::Vec};

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::types::{Action, SwapOffer};

pub const DOMAIN_TYPE: &[u8] =
    b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

pub const ACTION_TYPE: &[u8] = b"Action(uint8 kind,address target,uint256 value,bytes payload)";

// Referenced struct types are appended after the primary type.
pub const REQUEST_TYPE: &[u8] = b"AuthorizationRequest(Action[] actions,address[] signers,uint256[] nonces,uint64 deadline)Action(uint8 kind,address target,uint256 value,bytes payload)";

pub const SWAP_TYPE: &[u8] = b"SwapOffer(address ownerA,address ownerB,address tokenA,address tokenB,uint256 valueA,uint256 valueB,uint256 nonceA,uint256 nonceB,uint64 deadline)";

/// Deployment binding included in every digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Domain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    pub fn separator(&self) -> B256 {
        let mut buf = Vec::with_capacity(32 * 5);
        buf.extend_from_slice(keccak256(DOMAIN_TYPE).as_slice());
        buf.extend_from_slice(keccak256(self.name.as_bytes()).as_slice());
        buf.extend_from_slice(keccak256(self.version.as_bytes()).as_slice());
        buf.extend_from_slice(&U256::from(self.chain_id).to_be_bytes::<32>());
        buf.extend_from_slice(&address_word(self.verifying_contract));
        keccak256(buf)
    }

    /// Final digest: keccak256("\x19\x01" || domainSeparator || structHash).
    pub fn digest(&self, struct_hash: B256) -> B256 {
        domain_digest(self.separator(), struct_hash)
    }
}

pub fn domain_digest(separator: B256, struct_hash: B256) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.extend_from_slice(b"\x19\x01");
    buf.extend_from_slice(separator.as_slice());
    buf.extend_from_slice(struct_hash.as_slice());
    keccak256(buf)
}

pub fn hash_action(action: &Action) -> B256 {
    let mut buf = Vec::with_capacity(32 * 5);
    buf.extend_from_slice(keccak256(ACTION_TYPE).as_slice());
    buf.extend_from_slice(&u64_word(action.kind as u64));
    buf.extend_from_slice(&address_word(action.target));
    buf.extend_from_slice(&action.value.to_be_bytes::<32>());
    buf.extend_from_slice(keccak256(&action.payload).as_slice());
    keccak256(buf)
}

/// Order-sensitive flat commitment over the per-action hashes.
pub fn hash_action_list(actions: &[Action]) -> B256 {
    let mut buf = Vec::with_capacity(32 * actions.len());
    for action in actions {
        buf.extend_from_slice(hash_action(action).as_slice());
    }
    keccak256(buf)
}

pub fn hash_signers(signers: &[Address]) -> B256 {
    let mut buf = Vec::with_capacity(32 * signers.len());
    for signer in signers {
        buf.extend_from_slice(&address_word(*signer));
    }
    keccak256(buf)
}

pub fn hash_nonces(nonces: &[U256]) -> B256 {
    let mut buf = Vec::with_capacity(32 * nonces.len());
    for nonce in nonces {
        buf.extend_from_slice(&nonce.to_be_bytes::<32>());
    }
    keccak256(buf)
}

/// Struct encoding of a request with its nonce snapshot; `keccak256` of this is the struct hash.
pub fn encode_request(
    actions: &[Action],
    signers: &[Address],
    nonces: &[U256],
    deadline: u64,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 * 5);
    buf.extend_from_slice(keccak256(REQUEST_TYPE).as_slice());
    buf.extend_from_slice(hash_action_list(actions).as_slice());
    buf.extend_from_slice(hash_signers(signers).as_slice());
    buf.extend_from_slice(hash_nonces(nonces).as_slice());
    buf.extend_from_slice(&u64_word(deadline));
    buf
}

pub fn hash_request(actions: &[Action], signers: &[Address], nonces: &[U256], deadline: u64) -> B256 {
    keccak256(encode_request(actions, signers, nonces, deadline))
}

pub fn encode_swap(offer: &SwapOffer) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 * 10);
    buf.extend_from_slice(keccak256(SWAP_TYPE).as_slice());
    buf.extend_from_slice(&address_word(offer.owner_a));
    buf.extend_from_slice(&address_word(offer.owner_b));
    buf.extend_from_slice(&address_word(offer.token_a));
    buf.extend_from_slice(&address_word(offer.token_b));
    buf.extend_from_slice(&offer.value_a.to_be_bytes::<32>());
    buf.extend_from_slice(&offer.value_b.to_be_bytes::<32>());
    buf.extend_from_slice(&offer.nonce_a.to_be_bytes::<32>());
    buf.extend_from_slice(&offer.nonce_b.to_be_bytes::<32>());
    buf.extend_from_slice(&u64_word(offer.deadline));
    buf
}

pub fn hash_swap(offer: &SwapOffer) -> B256 {
    keccak256(encode_swap(offer))
}

fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..32].copy_from_slice(address.as_slice());
    word
}

fn u64_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..32].copy_from_slice(&value.to_be_bytes());
    word
}
