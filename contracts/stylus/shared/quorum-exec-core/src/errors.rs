use alloy_primitives::Address;
use thiserror::Error;

/// Why a request failed. Every variant aborts the whole request with no surviving effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("request expired at {deadline}")]
    ExpiredRequest { deadline: u64 },

    #[error("insufficient authorization: {provided} provided, {required} required ({fault})")]
    InsufficientAuthorization {
        provided: usize,
        required: usize,
        fault: AuthFault,
    },

    /// Also reported when recovery itself fails (`recovered` is then the zero address).
    #[error("recovered signer {recovered} does not match expected {expected}")]
    SignerMismatch { recovered: Address, expected: Address },

    #[error("action {index} failed: {reason}")]
    ActionFailure { index: usize, reason: CallError },

    #[error("nonce of {signer} is exhausted")]
    NonceExhausted { signer: Address },
}

/// Which membership/quorum rule rejected the signer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFault {
    #[error("fewer signatures than quorum")]
    BelowQuorum,
    #[error("signature count differs from signer count")]
    CountMismatch,
    #[error("signers not strictly ascending")]
    UnsortedSigners,
    #[error("signer is not a member")]
    NotMember,
}

/// Failure reported by the host while executing an action target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("call reverted")]
    Reverted,
    #[error("state change attempted in read-only call")]
    StaticStateChange,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("no code at {0}")]
    NoCode(Address),
}

/// Signature recovery failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecoverError {
    #[error("malformed signature")]
    Malformed,
    #[error("signature recovery failed")]
    Failed,
}

/// Invalid construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("membership is empty")]
    EmptyMembership,
    #[error("quorum {quorum} outside 1..={members}")]
    QuorumOutOfRange { quorum: usize, members: usize },
    #[error("duplicate member {0}")]
    DuplicateMember(Address),
    #[error("zero address cannot be a member")]
    ZeroMember,
}
