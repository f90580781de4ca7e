//! secp256k1 signing and recovery over engine digests.

use alloy_primitives::{keccak256, Address, B256, U256};
use anyhow::{anyhow, Context, Result};
use k256::{
    ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
};
use quorum_exec_core::{
    encoder::{hash_request, hash_swap},
    verifier::{split_signature, SignatureVerifier},
    AuthorizationRequest, Domain, RecoverError, SwapOffer,
};

/// Account identity of a public key: the low 20 bytes of keccak256 of the uncompressed point.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.as_affine().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

pub fn signer_address(key: &SigningKey) -> Address {
    address_of(key.verifying_key())
}

/// Parse a hex private key, with or without `0x`.
pub fn parse_private_key(raw: &str) -> Result<SigningKey> {
    let trimmed = raw.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_str).context("private key is not valid hex")?;
    SigningKey::from_slice(&bytes).map_err(|_| anyhow!("private key is not a valid secp256k1 scalar"))
}

/// Sign a 32-byte digest directly (no further hashing) as `r || s || v` with `v` in {27, 28}.
pub fn sign_digest(key: &SigningKey, digest: B256) -> Result<Vec<u8>, k256::ecdsa::Error> {
    let (signature, recovery_id) = key.sign_prehash_recoverable(digest.as_slice())?;
    let mut out = Vec::with_capacity(65);
    out.extend_from_slice(&signature.to_bytes());
    out.push(27 + recovery_id.to_byte());
    Ok(out)
}

pub fn sign_request(
    domain: &Domain,
    request: &AuthorizationRequest,
    nonces: &[U256],
    key: &SigningKey,
) -> Result<Vec<u8>, k256::ecdsa::Error> {
    let struct_hash = hash_request(&request.actions, &request.signers, nonces, request.deadline);
    sign_digest(key, domain.digest(struct_hash))
}

pub fn sign_offer(
    domain: &Domain,
    offer: &SwapOffer,
    key: &SigningKey,
) -> Result<Vec<u8>, k256::ecdsa::Error> {
    sign_digest(key, domain.digest(hash_swap(offer)))
}

/// Off-chain equivalent of the `ecrecover` precompile.
#[derive(Clone, Copy, Debug, Default)]
pub struct K256Recovery;

impl SignatureVerifier for K256Recovery {
    fn recover(&self, digest: B256, signature: &[u8]) -> Result<Address, RecoverError> {
        let (rs, v) = split_signature(signature)?;
        let signature = EcdsaSignature::from_slice(&rs).map_err(|_| RecoverError::Malformed)?;
        let recovery_id = RecoveryId::from_byte(v).ok_or(RecoverError::Malformed)?;
        let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
            .map_err(|_| RecoverError::Failed)?;
        Ok(address_of(&key))
    }
}
