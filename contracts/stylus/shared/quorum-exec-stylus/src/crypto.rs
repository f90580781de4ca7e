//! Signature recovery backed by the EVM `ecrecover` precompile.

use alloy_primitives::{address, Address, B256};
use quorum_exec_core::{errors::RecoverError, verifier::split_signature, SignatureVerifier};
use stylus_sdk::call::RawCall;

/// Precompile address 0x01.
const ECRECOVER: Address = address!("0000000000000000000000000000000000000001");

/// Gas forwarded to each precompile call (the precompile itself costs 3000).
const RECOVERY_GAS: u64 = 50_000;

#[derive(Clone, Copy, Debug, Default)]
pub struct PrecompileRecovery;

impl SignatureVerifier for PrecompileRecovery {
    fn recover(&self, digest: B256, signature: &[u8]) -> Result<Address, RecoverError> {
        let (rs, recovery_id) = split_signature(signature)?;

        // digest || v (as a word) || r || s
        let mut input = [0u8; 128];
        input[0..32].copy_from_slice(digest.as_slice());
        input[63] = recovery_id + 27;
        input[64..128].copy_from_slice(&rs);

        let out = unsafe { RawCall::new_static().gas(RECOVERY_GAS).call(ECRECOVER, &input) }
            .map_err(|_| RecoverError::Failed)?;
        // An invalid signature returns no data rather than reverting.
        if out.len() < 32 {
            return Err(RecoverError::Failed);
        }
        let recovered = Address::from_slice(&out[12..32]);
        if recovered == Address::ZERO {
            return Err(RecoverError::Failed);
        }
        Ok(recovered)
    }
}
