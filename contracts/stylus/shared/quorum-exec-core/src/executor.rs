//! General n-party engine: validate, advance nonces, digest, verify, then execute the action list
//! as one all-or-nothing unit.
//!
//! Nonces are advanced *before* signatures are checked. They are part of the signed content, and
//! an action target that re-enters the engine mid-batch must find the in-flight request's nonces
//! already spent, so a replay of it cannot reconstruct the same digest.

use alloc::vec::Vec;

use alloy_primitives::{Address, B256, U256};
use tracing::{debug, warn};

use crate::{
    encoder::{encode_request, hash_request, Domain},
    errors::ExecError,
    host::{dispatch, ActionHost},
    membership::{check_signers, Membership},
    nonces::NonceLedger,
    types::{AuthorizationRequest, Signature},
    verifier::{verify_signatures, SignatureVerifier},
};

/// Progress of a single request. `Completed` is only reached when every action succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Received,
    DeadlineChecked,
    SignersValidated,
    NoncesConsumed,
    DigestComputed,
    SignaturesVerified,
    Executing,
    Completed,
}

/// Outcome of a committed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    pub digest: B256,
    /// Nonce snapshot the signatures were checked against, aligned with the signer list.
    pub nonces: Vec<U256>,
    /// Return data of each action, in list order.
    pub results: Vec<Vec<u8>>,
}

pub struct BatchExecutor<M, N> {
    domain: Domain,
    membership: M,
    nonces: N,
    last_stage: Stage,
}

impl<M: Membership, N: NonceLedger> BatchExecutor<M, N> {
    pub fn new(domain: Domain, membership: M, nonces: N) -> Self {
        Self {
            domain,
            membership,
            nonces,
            last_stage: Stage::Received,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain.separator()
    }

    pub fn membership(&self) -> &M {
        &self.membership
    }

    pub fn nonce_of(&self, signer: Address) -> U256 {
        self.nonces.nonce_of(signer)
    }

    /// Last stage the most recent `run` reached: `Completed`, or where it aborted.
    pub fn last_stage(&self) -> Stage {
        self.last_stage
    }

    /// Exact struct preimage the engine hashes for `request` under `nonces`.
    pub fn encode_request_digest_preimage(
        &self,
        request: &AuthorizationRequest,
        nonces: &[U256],
    ) -> Vec<u8> {
        encode_request(&request.actions, &request.signers, nonces, request.deadline)
    }

    /// Domain-separated digest the signers must sign for `request` under `nonces`.
    pub fn request_digest(&self, request: &AuthorizationRequest, nonces: &[U256]) -> B256 {
        self.domain.digest(hash_request(
            &request.actions,
            &request.signers,
            nonces,
            request.deadline,
        ))
    }

    /// Authorise and execute `request`.
    ///
    /// On any failure the host is reverted to its state before the call and every consumed
    /// nonce is rewound, whichever stage failed.
    pub fn run<H, V>(
        &mut self,
        host: &mut H,
        verifier: &V,
        request: &AuthorizationRequest,
        signatures: &[Signature],
    ) -> Result<Execution, ExecError>
    where
        H: ActionHost,
        V: SignatureVerifier + ?Sized,
    {
        let checkpoint = host.checkpoint();
        let mut stage = Stage::Received;
        let mut consumed = Vec::with_capacity(request.signers.len());

        let outcome = self.advance(host, verifier, request, signatures, &mut stage, &mut consumed);
        self.last_stage = stage;
        match outcome {
            Ok(execution) => {
                debug!(digest = %execution.digest, actions = request.actions.len(), "request completed");
                Ok(execution)
            }
            Err(err) => {
                warn!(?stage, %err, "request aborted");
                host.revert_to(checkpoint);
                for (signer, nonce) in request.signers.iter().zip(consumed).rev() {
                    self.nonces.rewind(*signer, nonce);
                }
                Err(err)
            }
        }
    }

    fn advance<H, V>(
        &mut self,
        host: &mut H,
        verifier: &V,
        request: &AuthorizationRequest,
        signatures: &[Signature],
        stage: &mut Stage,
        consumed: &mut Vec<U256>,
    ) -> Result<Execution, ExecError>
    where
        H: ActionHost,
        V: SignatureVerifier + ?Sized,
    {
        if host.block_timestamp() > request.deadline {
            return Err(ExecError::ExpiredRequest {
                deadline: request.deadline,
            });
        }
        reach(stage, Stage::DeadlineChecked);

        check_signers(&self.membership, &request.signers, signatures.len())?;
        reach(stage, Stage::SignersValidated);

        for signer in &request.signers {
            let nonce = self
                .nonces
                .consume(*signer)
                .ok_or(ExecError::NonceExhausted { signer: *signer })?;
            consumed.push(nonce);
        }
        reach(stage, Stage::NoncesConsumed);

        let digest = self.request_digest(request, consumed);
        reach(stage, Stage::DigestComputed);

        verify_signatures(verifier, digest, &request.signers, signatures)?;
        reach(stage, Stage::SignaturesVerified);

        let mut results = Vec::with_capacity(request.actions.len());
        for (index, action) in request.actions.iter().enumerate() {
            if index == 0 {
                reach(stage, Stage::Executing);
            }
            let output = dispatch(host, action)
                .map_err(|reason| ExecError::ActionFailure { index, reason })?;
            results.push(output);
        }
        reach(stage, Stage::Completed);

        Ok(Execution {
            digest,
            nonces: consumed.clone(),
            results,
        })
    }
}

fn reach(stage: &mut Stage, next: Stage) {
    debug!(?next, "stage reached");
    *stage = next;
}
