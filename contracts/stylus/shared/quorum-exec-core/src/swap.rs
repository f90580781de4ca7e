//! Two-party specialisation: a single bidirectional exchange signed by both owners.
//!
//! The owners named in the offer are the whole membership and both must sign; ordering follows
//! the batch engine (nonces, then digest, then verification, then transfers).

use alloc::vec::Vec;

use alloy_primitives::{Address, B256, U256};
use tracing::{debug, warn};

use crate::{
    encoder::{encode_swap, hash_swap, Domain},
    errors::ExecError,
    host::TokenHost,
    nonces::NonceLedger,
    types::{Signature, SwapOffer, SwapTerms},
    verifier::{verify_signatures, SignatureVerifier},
};

pub struct SwapEngine<N> {
    domain: Domain,
    nonces: N,
}

impl<N: NonceLedger> SwapEngine<N> {
    pub fn new(domain: Domain, nonces: N) -> Self {
        Self { domain, nonces }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain.separator()
    }

    pub fn nonce_of(&self, owner: Address) -> U256 {
        self.nonces.nonce_of(owner)
    }

    pub fn encode_swap_digest_preimage(&self, offer: &SwapOffer) -> Vec<u8> {
        encode_swap(offer)
    }

    pub fn offer_digest(&self, offer: &SwapOffer) -> B256 {
        self.domain.digest(hash_swap(offer))
    }

    /// The offer each owner must sign if `terms` were submitted now.
    pub fn pending_offer(&self, terms: &SwapTerms) -> SwapOffer {
        let nonce_a = self.nonces.nonce_of(terms.owner_a);
        let mut nonce_b = self.nonces.nonce_of(terms.owner_b);
        if terms.owner_a == terms.owner_b {
            nonce_b = nonce_b.saturating_add(U256::from(1u64));
        }
        terms.with_nonces(nonce_a, nonce_b)
    }

    /// Authorise and settle the exchange. Returns the offer that was signed.
    pub fn swap<H, V>(
        &mut self,
        host: &mut H,
        verifier: &V,
        terms: &SwapTerms,
        signature_a: &Signature,
        signature_b: &Signature,
    ) -> Result<SwapOffer, ExecError>
    where
        H: TokenHost,
        V: SignatureVerifier + ?Sized,
    {
        if host.block_timestamp() > terms.deadline {
            warn!(deadline = terms.deadline, "swap expired");
            return Err(ExecError::ExpiredRequest {
                deadline: terms.deadline,
            });
        }

        let checkpoint = host.checkpoint();
        let Some(nonce_a) = self.nonces.consume(terms.owner_a) else {
            warn!(owner = %terms.owner_a, "swap aborted: nonce exhausted");
            return Err(ExecError::NonceExhausted {
                signer: terms.owner_a,
            });
        };
        let Some(nonce_b) = self.nonces.consume(terms.owner_b) else {
            warn!(owner = %terms.owner_b, "swap aborted: nonce exhausted");
            self.nonces.rewind(terms.owner_a, nonce_a);
            return Err(ExecError::NonceExhausted {
                signer: terms.owner_b,
            });
        };
        let offer = terms.with_nonces(nonce_a, nonce_b);

        match self.settle(host, verifier, &offer, signature_a, signature_b) {
            Ok(digest) => {
                debug!(%digest, "swap settled");
                Ok(offer)
            }
            Err(err) => {
                warn!(%err, "swap aborted");
                host.revert_to(checkpoint);
                self.nonces.rewind(terms.owner_b, nonce_b);
                self.nonces.rewind(terms.owner_a, nonce_a);
                Err(err)
            }
        }
    }

    fn settle<H, V>(
        &self,
        host: &mut H,
        verifier: &V,
        offer: &SwapOffer,
        signature_a: &Signature,
        signature_b: &Signature,
    ) -> Result<B256, ExecError>
    where
        H: TokenHost,
        V: SignatureVerifier + ?Sized,
    {
        let digest = self.offer_digest(offer);
        verify_signatures(
            verifier,
            digest,
            &[offer.owner_a, offer.owner_b],
            &[signature_a.clone(), signature_b.clone()],
        )?;

        host.transfer_from(offer.token_a, offer.owner_a, offer.owner_b, offer.value_a)
            .map_err(|reason| ExecError::ActionFailure { index: 0, reason })?;
        host.transfer_from(offer.token_b, offer.owner_b, offer.owner_a, offer.value_b)
            .map_err(|reason| ExecError::ActionFailure { index: 1, reason })?;
        Ok(digest)
    }
}
