use alloc::vec::Vec;

use alloy_primitives::{Address, U256};

/// Raw signature bytes (`r || s || v`), bound to one digest and one claimed signer.
pub type Signature = Vec<u8>;

/// How an action's target is invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ActionKind {
    /// Call the target with the attached value; the target's own state may change.
    ValueCall = 0x00,
    /// Run the target's code against the engine's own state and identity.
    ///
    /// This is a higher-trust tier than the other kinds: the delegated code can rewrite the
    /// engine's nonces and membership. Quorum authorisation is the only gate.
    DelegatedCall = 0x01,
    /// Call the target without permission to mutate state.
    ReadOnlyCall = 0x02,
}

impl TryFrom<u8> for ActionKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use ActionKind::*;
        let kind = match value {
            0x00 => ValueCall,
            0x01 => DelegatedCall,
            0x02 => ReadOnlyCall,
            _ => return Err(()),
        };
        Ok(kind)
    }
}

/// One step of an authorised batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub target: Address,
    pub value: U256,
    pub payload: Vec<u8>,
}

impl Action {
    pub fn value_call(target: Address, value: U256, payload: Vec<u8>) -> Self {
        Self { kind: ActionKind::ValueCall, target, value, payload }
    }

    pub fn delegated_call(target: Address, payload: Vec<u8>) -> Self {
        Self { kind: ActionKind::DelegatedCall, target, value: U256::ZERO, payload }
    }

    pub fn read_only_call(target: Address, payload: Vec<u8>) -> Self {
        Self { kind: ActionKind::ReadOnlyCall, target, value: U256::ZERO, payload }
    }
}

/// Caller-supplied request content.
///
/// Nonces are not part of this struct: the executor captures them from its ledger while
/// validating, and they only appear in the signed digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub actions: Vec<Action>,
    /// Strictly ascending.
    pub signers: Vec<Address>,
    /// Unix seconds; the request is valid while `now <= deadline`.
    pub deadline: u64,
}

/// Caller-supplied terms of a two-party exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapTerms {
    pub owner_a: Address,
    pub owner_b: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub value_a: U256,
    pub value_b: U256,
    pub deadline: u64,
}

impl SwapTerms {
    /// Attach the nonce snapshot, producing the struct both owners sign.
    pub fn with_nonces(&self, nonce_a: U256, nonce_b: U256) -> SwapOffer {
        SwapOffer {
            owner_a: self.owner_a,
            owner_b: self.owner_b,
            token_a: self.token_a,
            token_b: self.token_b,
            value_a: self.value_a,
            value_b: self.value_b,
            nonce_a,
            nonce_b,
            deadline: self.deadline,
        }
    }
}

/// Signed content of a two-party exchange: ownerA sends valueA of tokenA to ownerB and ownerB
/// sends valueB of tokenB to ownerA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapOffer {
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
