use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::{
    encoder::{domain_digest, hash_action, hash_action_list, Domain},
    errors::{AuthFault, CallError, ConfigError, ExecError, RecoverError},
    executor::{BatchExecutor, Stage},
    host::{ActionHost, Environment, TokenHost},
    membership::QuorumPolicy,
    nonces::{MemoryNonces, NonceLedger},
    swap::SwapEngine,
    types::{Action, ActionKind, AuthorizationRequest, Signature, SwapTerms},
    verifier::{split_signature, SignatureVerifier},
    EngineConfig,
};

const NOW: u64 = 1_700_000_000;

fn alice() -> Address {
    Address::repeat_byte(0x11)
}

fn bob() -> Address {
    Address::repeat_byte(0x22)
}

fn joe() -> Address {
    Address::repeat_byte(0x33)
}

fn engine_address() -> Address {
    Address::repeat_byte(0xEE)
}

/// Test signature: `digest || signer`. Binds one digest to one claimed signer.
struct MockVerifier;

impl SignatureVerifier for MockVerifier {
    fn recover(&self, digest: B256, signature: &[u8]) -> Result<Address, RecoverError> {
        if signature.len() != 52 {
            return Err(RecoverError::Malformed);
        }
        if signature[..32] != digest[..] {
            return Err(RecoverError::Failed);
        }
        Ok(Address::from_slice(&signature[32..]))
    }
}

fn mock_sign(signer: Address, digest: B256) -> Signature {
    let mut sig = digest.to_vec();
    sig.extend_from_slice(signer.as_slice());
    sig
}

#[derive(Default)]
struct MockHost {
    now: u64,
    calls: Vec<(ActionKind, Address)>,
    transfers: Vec<(Address, Address, Address, U256)>,
    failing: BTreeSet<Address>,
}

impl MockHost {
    fn at(now: u64) -> Self {
        Self { now, ..Default::default() }
    }

    fn record(&mut self, kind: ActionKind, target: Address) -> Result<Vec<u8>, CallError> {
        if self.failing.contains(&target) {
            return Err(CallError::Reverted);
        }
        self.calls.push((kind, target));
        Ok(target.to_vec())
    }
}

impl Environment for MockHost {
    type Checkpoint = (usize, usize);

    fn block_timestamp(&self) -> u64 {
        self.now
    }

    fn checkpoint(&mut self) -> Self::Checkpoint {
        (self.calls.len(), self.transfers.len())
    }

    fn revert_to(&mut self, checkpoint: Self::Checkpoint) {
        self.calls.truncate(checkpoint.0);
        self.transfers.truncate(checkpoint.1);
    }
}

impl ActionHost for MockHost {
    fn call(&mut self, target: Address, _value: U256, _payload: &[u8]) -> Result<Vec<u8>, CallError> {
        self.record(ActionKind::ValueCall, target)
    }

    fn delegate_call(&mut self, target: Address, _payload: &[u8]) -> Result<Vec<u8>, CallError> {
        self.record(ActionKind::DelegatedCall, target)
    }

    fn static_call(&mut self, target: Address, _payload: &[u8]) -> Result<Vec<u8>, CallError> {
        self.record(ActionKind::ReadOnlyCall, target)
    }
}

impl TokenHost for MockHost {
    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CallError> {
        if self.failing.contains(&token) {
            return Err(CallError::InsufficientBalance);
        }
        self.transfers.push((token, from, to, amount));
        Ok(())
    }
}

fn domain() -> Domain {
    Domain::new("Quorum Executor", "1", 42161, engine_address())
}

fn executor(quorum: usize) -> BatchExecutor<QuorumPolicy, MemoryNonces> {
    let policy = QuorumPolicy::new([alice(), bob(), joe()], quorum).unwrap();
    BatchExecutor::new(domain(), policy, MemoryNonces::new())
}

fn request(actions: Vec<Action>, signers: Vec<Address>, deadline: u64) -> AuthorizationRequest {
    AuthorizationRequest { actions, signers, deadline }
}

/// Sign against the executor's current nonces, as an off-chain signer would.
fn sign_all<M, N>(exec: &BatchExecutor<M, N>, req: &AuthorizationRequest) -> Vec<Signature>
where
    M: crate::membership::Membership,
    N: NonceLedger,
{
    let nonces: Vec<U256> = req.signers.iter().map(|s| exec.nonce_of(*s)).collect();
    let digest = exec.request_digest(req, &nonces);
    req.signers.iter().map(|s| mock_sign(*s, digest)).collect()
}

fn token() -> Address {
    Address::repeat_byte(0x7A)
}

#[test]
fn test_preimage_reproduces_internal_digest() {
    let mut exec = executor(2);
    let req = request(
        vec![Action::value_call(token(), U256::ZERO, vec![0xAA, 0xBB])],
        vec![alice(), bob()],
        NOW + 60,
    );
    let snapshot = vec![exec.nonce_of(alice()), exec.nonce_of(bob())];
    let preimage = exec.encode_request_digest_preimage(&req, &snapshot);
    assert_eq!(preimage.len(), 32 * 5);

    let rebuilt = domain_digest(exec.domain_separator(), keccak256(&preimage));
    let sigs = sign_all(&exec, &req);
    let execution = exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &sigs).unwrap();

    assert_eq!(execution.digest, rebuilt);
    assert_eq!(execution.nonces, snapshot);
}

#[test]
fn test_ascending_signers_accepted() {
    let mut exec = executor(2);
    let req = request(vec![], vec![alice(), bob()], NOW);
    let sigs = sign_all(&exec, &req);
    assert!(exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &sigs).is_ok());
}

#[test]
fn test_descending_signers_rejected() {
    let mut exec = executor(2);
    let req = request(vec![], vec![bob(), alice()], NOW);
    let sigs = sign_all(&exec, &req);
    let err = exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &sigs).unwrap_err();
    assert_eq!(
        err,
        ExecError::InsufficientAuthorization { provided: 1, required: 2, fault: AuthFault::UnsortedSigners }
    );
    assert_eq!(exec.nonce_of(alice()), U256::ZERO);
    assert_eq!(exec.nonce_of(bob()), U256::ZERO);
}

#[test]
fn test_duplicate_signers_rejected() {
    let mut exec = executor(2);
    let req = request(vec![], vec![alice(), alice()], NOW);
    let sigs = sign_all(&exec, &req);
    let err = exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &sigs).unwrap_err();
    assert!(matches!(
        err,
        ExecError::InsufficientAuthorization { fault: AuthFault::UnsortedSigners, .. }
    ));
}

#[test]
fn test_non_member_rejected() {
    let mut exec = executor(2);
    let outsider = Address::repeat_byte(0x44);
    let req = request(vec![], vec![alice(), outsider], NOW);
    let sigs = sign_all(&exec, &req);
    let err = exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &sigs).unwrap_err();
    assert!(matches!(
        err,
        ExecError::InsufficientAuthorization { fault: AuthFault::NotMember, .. }
    ));
}

#[test]
fn test_replay_with_stale_nonces_fails() {
    let mut exec = executor(2);
    let req = request(vec![Action::value_call(token(), U256::ZERO, vec![])], vec![alice(), bob()], NOW);
    let sigs = sign_all(&exec, &req);
    let mut host = MockHost::at(NOW);

    exec.run(&mut host, &MockVerifier, &req, &sigs).unwrap();
    assert_eq!(exec.nonce_of(alice()), U256::from(1u64));

    let err = exec.run(&mut host, &MockVerifier, &req, &sigs).unwrap_err();
    assert_eq!(
        err,
        ExecError::SignerMismatch { recovered: Address::ZERO, expected: alice() }
    );
    assert_eq!(host.calls.len(), 1);
    assert_eq!(exec.nonce_of(alice()), U256::from(1u64));
    assert_eq!(exec.nonce_of(bob()), U256::from(1u64));
}

#[test]
fn test_deadline_boundary() {
    let mut exec = executor(2);
    let on_time = request(vec![], vec![alice(), bob()], NOW);
    let sigs = sign_all(&exec, &on_time);
    assert!(exec.run(&mut MockHost::at(NOW), &MockVerifier, &on_time, &sigs).is_ok());

    let late = request(vec![], vec![alice(), bob()], NOW - 1);
    let sigs = sign_all(&exec, &late);
    let err = exec.run(&mut MockHost::at(NOW), &MockVerifier, &late, &sigs).unwrap_err();
    assert_eq!(err, ExecError::ExpiredRequest { deadline: NOW - 1 });
}

#[test]
fn test_quorum_boundary() {
    let mut exec = executor(3);
    let short = request(vec![], vec![alice(), bob()], NOW);
    let sigs = sign_all(&exec, &short);
    let err = exec.run(&mut MockHost::at(NOW), &MockVerifier, &short, &sigs).unwrap_err();
    assert_eq!(
        err,
        ExecError::InsufficientAuthorization { provided: 2, required: 3, fault: AuthFault::BelowQuorum }
    );

    let full = request(vec![], vec![alice(), bob(), joe()], NOW);
    let sigs = sign_all(&exec, &full);
    assert!(exec.run(&mut MockHost::at(NOW), &MockVerifier, &full, &sigs).is_ok());
}

#[test]
fn test_signature_count_must_match_signers() {
    let mut exec = executor(1);
    let req = request(vec![], vec![alice(), bob()], NOW);
    let mut sigs = sign_all(&exec, &req);
    sigs.pop();
    let err = exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &sigs).unwrap_err();
    assert_eq!(
        err,
        ExecError::InsufficientAuthorization { provided: 1, required: 2, fault: AuthFault::CountMismatch }
    );
}

#[test]
fn test_swapped_signatures_report_mismatch() {
    let mut exec = executor(2);
    let req = request(vec![], vec![alice(), bob()], NOW);
    let mut sigs = sign_all(&exec, &req);
    sigs.swap(0, 1);
    let err = exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &sigs).unwrap_err();
    assert_eq!(err, ExecError::SignerMismatch { recovered: bob(), expected: alice() });
    assert_eq!(exec.nonce_of(alice()), U256::ZERO);
}

#[test]
fn test_failing_action_rolls_back_everything() {
    let mut exec = executor(2);
    let broken = Address::repeat_byte(0x99);
    let req = request(
        vec![
            Action::value_call(token(), U256::ZERO, vec![1]),
            Action::value_call(broken, U256::ZERO, vec![2]),
        ],
        vec![alice(), bob()],
        NOW,
    );
    let sigs = sign_all(&exec, &req);
    let mut host = MockHost::at(NOW);
    host.failing.insert(broken);

    let err = exec.run(&mut host, &MockVerifier, &req, &sigs).unwrap_err();
    assert_eq!(err, ExecError::ActionFailure { index: 1, reason: CallError::Reverted });
    assert!(host.calls.is_empty());
    assert_eq!(exec.nonce_of(alice()), U256::ZERO);
    assert_eq!(exec.nonce_of(bob()), U256::ZERO);

    // Nothing was consumed, so the same signatures still authorise once the target recovers.
    host.failing.clear();
    let execution = exec.run(&mut host, &MockVerifier, &req, &sigs).unwrap();
    assert_eq!(execution.results.len(), 2);
    assert_eq!(host.calls.len(), 2);
}

#[test]
fn test_empty_batch_consumes_nonces() {
    let mut exec = executor(2);
    let req = request(vec![], vec![alice(), bob()], NOW);
    let sigs = sign_all(&exec, &req);
    let execution = exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &sigs).unwrap();
    assert!(execution.results.is_empty());
    assert_eq!(exec.nonce_of(alice()), U256::from(1u64));
    assert_eq!(exec.nonce_of(bob()), U256::from(1u64));
    assert_eq!(exec.nonce_of(joe()), U256::ZERO);
}

#[test]
fn test_actions_dispatch_by_kind_in_order() {
    let mut exec = executor(1);
    let (a, b, c) = (Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3));
    let req = request(
        vec![
            Action::read_only_call(a, vec![]),
            Action::value_call(b, U256::from(5u64), vec![]),
            Action::delegated_call(c, vec![]),
        ],
        vec![joe()],
        NOW,
    );
    let sigs = sign_all(&exec, &req);
    let mut host = MockHost::at(NOW);
    let execution = exec.run(&mut host, &MockVerifier, &req, &sigs).unwrap();
    assert_eq!(
        host.calls,
        vec![
            (ActionKind::ReadOnlyCall, a),
            (ActionKind::ValueCall, b),
            (ActionKind::DelegatedCall, c),
        ]
    );
    assert_eq!(execution.results[2], c.to_vec());
}

#[test]
fn test_action_hashing() {
    let empty = Action::value_call(token(), U256::ZERO, vec![]);
    let filled = Action::value_call(token(), U256::ZERO, vec![0u8; 300]);
    assert_eq!(hash_action(&empty), hash_action(&empty.clone()));
    assert_ne!(hash_action(&empty), hash_action(&filled));

    let delegated = Action { kind: ActionKind::DelegatedCall, ..empty.clone() };
    assert_ne!(hash_action(&empty), hash_action(&delegated));

    let forward = hash_action_list(&[empty.clone(), filled.clone()]);
    let reverse = hash_action_list(&[filled, empty]);
    assert_ne!(forward, reverse);
    assert_eq!(hash_action_list(&[]), keccak256(b""));
}

#[test]
fn test_digest_bound_to_domain() {
    let exec = executor(2);
    let req = request(vec![], vec![alice(), bob()], NOW);
    let nonces = [U256::ZERO, U256::ZERO];
    let digest = exec.request_digest(&req, &nonces);

    let struct_hash = keccak256(exec.encode_request_digest_preimage(&req, &nonces));
    let other_chain = Domain::new("Quorum Executor", "1", 1, engine_address());
    let other_version = Domain::new("Quorum Executor", "2", 42161, engine_address());
    let other_contract = Domain::new("Quorum Executor", "1", 42161, Address::repeat_byte(0xEF));

    assert_eq!(domain().digest(struct_hash), digest);
    assert_ne!(other_chain.digest(struct_hash), digest);
    assert_ne!(other_version.digest(struct_hash), digest);
    assert_ne!(other_contract.digest(struct_hash), digest);
    assert_ne!(exec.request_digest(&req, &[U256::from(1u64), U256::ZERO]), digest);
}

#[test]
fn test_config_validation() {
    assert_eq!(QuorumPolicy::new(Vec::<Address>::new(), 1).unwrap_err(), ConfigError::EmptyMembership);
    assert_eq!(
        QuorumPolicy::new([alice(), bob()], 0).unwrap_err(),
        ConfigError::QuorumOutOfRange { quorum: 0, members: 2 }
    );
    assert_eq!(
        QuorumPolicy::new([alice(), bob()], 3).unwrap_err(),
        ConfigError::QuorumOutOfRange { quorum: 3, members: 2 }
    );
    assert_eq!(
        QuorumPolicy::new([alice(), alice()], 1).unwrap_err(),
        ConfigError::DuplicateMember(alice())
    );
    assert_eq!(QuorumPolicy::new([Address::ZERO], 1).unwrap_err(), ConfigError::ZeroMember);

    let config = EngineConfig {
        domain_name: "Quorum Executor".into(),
        domain_version: "1".into(),
        members: vec![joe(), alice(), bob()],
        quorum: 2,
    };
    let exec = config.build(42161, engine_address()).unwrap();
    assert_eq!(exec.domain(), &domain());
    assert_eq!(exec.membership().len(), 3);
}

#[test]
fn test_memory_nonces_rewind() {
    let mut nonces = MemoryNonces::new();
    assert_eq!(nonces.consume(alice()), Some(U256::ZERO));
    assert_eq!(nonces.consume(alice()), Some(U256::from(1u64)));
    nonces.rewind(alice(), U256::from(1u64));
    assert_eq!(nonces.nonce_of(alice()), U256::from(1u64));
    nonces.rewind(alice(), U256::ZERO);
    assert_eq!(nonces.nonce_of(alice()), U256::ZERO);
}

#[test]
fn test_split_signature_normalises_v() {
    let mut sig = [7u8; 65];
    sig[64] = 28;
    assert_eq!(split_signature(&sig).unwrap().1, 1);
    sig[64] = 0;
    assert_eq!(split_signature(&sig).unwrap().1, 0);
    sig[64] = 29;
    assert_eq!(split_signature(&sig).unwrap_err(), RecoverError::Malformed);
    assert_eq!(split_signature(&sig[..64]).unwrap_err(), RecoverError::Malformed);
}

fn terms(deadline: u64) -> SwapTerms {
    SwapTerms {
        owner_a: bob(),
        owner_b: alice(),
        token_a: Address::repeat_byte(0xA0),
        token_b: Address::repeat_byte(0xB0),
        value_a: U256::from(10u64),
        value_b: U256::from(5u64),
        deadline,
    }
}

#[test]
fn test_swap_settles_both_legs() {
    let mut engine = SwapEngine::new(domain(), MemoryNonces::new());
    let terms = terms(NOW + 1);
    let offer = engine.pending_offer(&terms);
    let digest = engine.offer_digest(&offer);
    let mut host = MockHost::at(NOW);

    let signed = engine
        .swap(&mut host, &MockVerifier, &terms, &mock_sign(bob(), digest), &mock_sign(alice(), digest))
        .unwrap();
    assert_eq!(signed, offer);
    assert_eq!(
        host.transfers,
        vec![
            (terms.token_a, bob(), alice(), U256::from(10u64)),
            (terms.token_b, alice(), bob(), U256::from(5u64)),
        ]
    );
    assert_eq!(engine.nonce_of(bob()), U256::from(1u64));
    assert_eq!(engine.nonce_of(alice()), U256::from(1u64));
}

#[test]
fn test_swap_failure_rolls_back() {
    let mut engine = SwapEngine::new(domain(), MemoryNonces::new());
    let terms = terms(NOW);
    let digest = engine.offer_digest(&engine.pending_offer(&terms));
    let mut host = MockHost::at(NOW);
    host.failing.insert(terms.token_b);

    let err = engine
        .swap(&mut host, &MockVerifier, &terms, &mock_sign(bob(), digest), &mock_sign(alice(), digest))
        .unwrap_err();
    assert_eq!(err, ExecError::ActionFailure { index: 1, reason: CallError::InsufficientBalance });
    assert!(host.transfers.is_empty());
    assert_eq!(engine.nonce_of(bob()), U256::ZERO);
    assert_eq!(engine.nonce_of(alice()), U256::ZERO);
}

#[test]
fn test_swap_rejects_wrong_owner_and_expiry() {
    let mut engine = SwapEngine::new(domain(), MemoryNonces::new());
    let terms = terms(NOW);
    let digest = engine.offer_digest(&engine.pending_offer(&terms));
    let mut host = MockHost::at(NOW);

    let err = engine
        .swap(&mut host, &MockVerifier, &terms, &mock_sign(bob(), digest), &mock_sign(joe(), digest))
        .unwrap_err();
    assert_eq!(err, ExecError::SignerMismatch { recovered: joe(), expected: alice() });

    let mut late = MockHost::at(NOW + 1);
    let err = engine
        .swap(&mut late, &MockVerifier, &terms, &mock_sign(bob(), digest), &mock_sign(alice(), digest))
        .unwrap_err();
    assert_eq!(err, ExecError::ExpiredRequest { deadline: NOW });
    assert_eq!(engine.nonce_of(bob()), U256::ZERO);
}

#[test]
fn test_swap_same_owner_uses_consecutive_nonces() {
    let mut engine = SwapEngine::new(domain(), MemoryNonces::new());
    let mut terms = terms(NOW);
    terms.owner_b = terms.owner_a;
    let offer = engine.pending_offer(&terms);
    assert_eq!((offer.nonce_a, offer.nonce_b), (U256::ZERO, U256::from(1u64)));

    let digest = engine.offer_digest(&offer);
    let sig = mock_sign(bob(), digest);
    engine.swap(&mut MockHost::at(NOW), &MockVerifier, &terms, &sig, &sig).unwrap();
    assert_eq!(engine.nonce_of(bob()), U256::from(2u64));
}

/// Ledger handle shared between an executor and a host, so actions can read the live counters.
#[derive(Clone, Default)]
struct SharedNonces(Rc<RefCell<MemoryNonces>>);

impl NonceLedger for SharedNonces {
    fn nonce_of(&self, signer: Address) -> U256 {
        self.0.borrow().nonce_of(signer)
    }

    fn consume(&mut self, signer: Address) -> Option<U256> {
        self.0.borrow_mut().consume(signer)
    }

    fn rewind(&mut self, signer: Address, nonce: U256) {
        self.0.borrow_mut().rewind(signer, nonce);
    }
}

/// Every action reads the engine's counter for `alice`, as a callee re-entering the engine would.
struct ObservingHost {
    ledger: SharedNonces,
    seen: Vec<U256>,
}

impl ObservingHost {
    fn observe(&mut self) -> Result<Vec<u8>, CallError> {
        self.seen.push(self.ledger.nonce_of(alice()));
        Ok(Vec::new())
    }
}

impl Environment for ObservingHost {
    type Checkpoint = ();

    fn block_timestamp(&self) -> u64 {
        NOW
    }

    fn checkpoint(&mut self) -> Self::Checkpoint {}

    fn revert_to(&mut self, _checkpoint: Self::Checkpoint) {}
}

impl ActionHost for ObservingHost {
    fn call(&mut self, _target: Address, _value: U256, _payload: &[u8]) -> Result<Vec<u8>, CallError> {
        self.observe()
    }

    fn delegate_call(&mut self, _target: Address, _payload: &[u8]) -> Result<Vec<u8>, CallError> {
        self.observe()
    }

    fn static_call(&mut self, _target: Address, _payload: &[u8]) -> Result<Vec<u8>, CallError> {
        self.observe()
    }
}

#[test]
fn test_actions_see_spent_nonces() {
    let ledger = SharedNonces::default();
    let policy = QuorumPolicy::new([alice(), bob(), joe()], 2).unwrap();
    let mut exec = BatchExecutor::new(domain(), policy, ledger.clone());
    let req = request(
        vec![
            Action::value_call(token(), U256::ZERO, vec![]),
            Action::delegated_call(token(), vec![]),
            Action::read_only_call(token(), vec![]),
        ],
        vec![alice(), bob()],
        NOW,
    );
    let sigs = sign_all(&exec, &req);
    let mut host = ObservingHost { ledger, seen: Vec::new() };

    exec.run(&mut host, &MockVerifier, &req, &sigs).unwrap();
    assert_eq!(host.seen, vec![U256::from(1u64); 3]);

    // Re-submitting the same request from inside an action would be checked against nonce 1.
    let replay = sign_all(&exec, &req);
    assert_ne!(replay, sigs);
}

#[test]
fn test_last_stage_tracks_abort_point() {
    let mut exec = executor(2);
    assert_eq!(exec.last_stage(), Stage::Received);

    let broken = Address::repeat_byte(0x99);
    let req = request(vec![Action::value_call(broken, U256::ZERO, vec![])], vec![alice(), bob()], NOW);
    let sigs = sign_all(&exec, &req);
    let mut host = MockHost::at(NOW);
    host.failing.insert(broken);
    exec.run(&mut host, &MockVerifier, &req, &sigs).unwrap_err();
    assert_eq!(exec.last_stage(), Stage::Executing);

    let mut swapped = sigs.clone();
    swapped.swap(0, 1);
    exec.run(&mut MockHost::at(NOW), &MockVerifier, &req, &swapped).unwrap_err();
    assert_eq!(exec.last_stage(), Stage::DigestComputed);

    exec.run(&mut MockHost::at(NOW + 1), &MockVerifier, &req, &sigs).unwrap_err();
    assert_eq!(exec.last_stage(), Stage::Received);

    let empty = request(vec![], vec![alice(), bob()], NOW);
    let sigs = sign_all(&exec, &empty);
    exec.run(&mut MockHost::at(NOW), &MockVerifier, &empty, &sigs).unwrap();
    assert_eq!(exec.last_stage(), Stage::Completed);
}

#[test]
fn test_exhausted_nonce_aborts_without_wrapping() {
    let mut nonces = MemoryNonces::new();
    nonces.rewind(bob(), U256::MAX);
    assert_eq!(nonces.clone().consume(bob()), None);

    let policy = QuorumPolicy::new([alice(), bob(), joe()], 2).unwrap();
    let mut exec = BatchExecutor::new(domain(), policy, nonces);
    let req = request(vec![Action::value_call(token(), U256::ZERO, vec![])], vec![alice(), bob()], NOW);
    let sigs = sign_all(&exec, &req);
    let mut host = MockHost::at(NOW);

    for _ in 0..2 {
        let err = exec.run(&mut host, &MockVerifier, &req, &sigs).unwrap_err();
        assert_eq!(err, ExecError::NonceExhausted { signer: bob() });
        assert_eq!(exec.last_stage(), Stage::SignersValidated);
    }
    assert!(host.calls.is_empty());
    assert_eq!(exec.nonce_of(alice()), U256::ZERO);
    assert_eq!(exec.nonce_of(bob()), U256::MAX);
}

#[test]
fn test_swap_exhausted_nonce_keeps_other_owner() {
    let mut nonces = MemoryNonces::new();
    nonces.rewind(alice(), U256::MAX);
    let mut engine = SwapEngine::new(domain(), nonces);
    let terms = terms(NOW);
    let digest = engine.offer_digest(&engine.pending_offer(&terms));
    let mut host = MockHost::at(NOW);

    let err = engine
        .swap(&mut host, &MockVerifier, &terms, &mock_sign(bob(), digest), &mock_sign(alice(), digest))
        .unwrap_err();
    assert_eq!(err, ExecError::NonceExhausted { signer: alice() });
    assert!(host.transfers.is_empty());
    assert_eq!(engine.nonce_of(bob()), U256::ZERO);
    assert_eq!(engine.nonce_of(alice()), U256::MAX);
}
