//! Signature recovery seam.
//!
//! The engine never distinguishes a malformed signature from a valid signature by the wrong key:
//! both surface as `ExecError::SignerMismatch`.

use alloy_primitives::{Address, B256};

use crate::{
    errors::{ExecError, RecoverError},
    types::Signature,
};

pub trait SignatureVerifier {
    /// Recover the signing identity of `digest`. Must be pure and deterministic.
    fn recover(&self, digest: B256, signature: &[u8]) -> Result<Address, RecoverError>;
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn recover(&self, digest: B256, signature: &[u8]) -> Result<Address, RecoverError> {
        (**self).recover(digest, signature)
    }
}

/// Split a 65-byte `r || s || v` signature, normalising `v` to a recovery id in `{0, 1}`.
pub fn split_signature(signature: &[u8]) -> Result<([u8; 64], u8), RecoverError> {
    if signature.len() != 65 {
        return Err(RecoverError::Malformed);
    }
    let recovery_id = match signature[64] {
        0 | 1 => signature[64],
        27 | 28 => signature[64] - 27,
        _ => return Err(RecoverError::Malformed),
    };
    let mut rs = [0u8; 64];
    rs.copy_from_slice(&signature[..64]);
    Ok((rs, recovery_id))
}

/// Recover each signature and compare it against the signer at the same position.
///
/// The first mismatch aborts.
pub fn verify_signatures<V: SignatureVerifier + ?Sized>(
    verifier: &V,
    digest: B256,
    signers: &[Address],
    signatures: &[Signature],
) -> Result<(), ExecError> {
    for (expected, signature) in signers.iter().zip(signatures) {
        // The zero address is never a valid recovery result, even for a zero `expected`.
        let recovered = match verifier.recover(digest, signature) {
            Ok(recovered) if recovered == *expected && recovered != Address::ZERO => continue,
            Ok(recovered) => recovered,
            Err(_) => Address::ZERO,
        };
        return Err(ExecError::SignerMismatch {
            recovered,
            expected: *expected,
        });
    }
    Ok(())
}
