use alloy_primitives::U256;
use alloy_sol_types::sol;
use quorum_exec_core::{AuthFault, ConfigError, ExecError};
use stylus_sdk::stylus_proc::SolidityError;

sol! {
    error ExpiredRequest(uint64 deadline);
    /// `fault`: 0 below quorum, 1 signature/signer count mismatch, 2 unsorted or duplicate
    /// signers, 3 non-member signer.
    error InsufficientAuthorization(uint8 fault, uint256 provided, uint256 required);
    error SignerMismatch(address recovered, address expected);
    error ActionFailure(uint256 index);
    error UnknownActionKind(uint256 index, uint8 kind);
    error InvalidConfiguration();
    error NonceExhausted(address signer);
}

#[derive(SolidityError)]
pub enum ExecutorError {
    ExpiredRequest(ExpiredRequest),
    InsufficientAuthorization(InsufficientAuthorization),
    SignerMismatch(SignerMismatch),
    ActionFailure(ActionFailure),
    UnknownActionKind(UnknownActionKind),
    InvalidConfiguration(InvalidConfiguration),
    NonceExhausted(NonceExhausted),
}

fn fault_code(fault: AuthFault) -> u8 {
    match fault {
        AuthFault::BelowQuorum => 0,
        AuthFault::CountMismatch => 1,
        AuthFault::UnsortedSigners => 2,
        AuthFault::NotMember => 3,
    }
}

impl From<ExecError> for ExecutorError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::ExpiredRequest { deadline } => {
                ExecutorError::ExpiredRequest(ExpiredRequest { deadline })
            }
            ExecError::InsufficientAuthorization {
                provided,
                required,
                fault,
            } => ExecutorError::InsufficientAuthorization(InsufficientAuthorization {
                fault: fault_code(fault),
                provided: U256::from(provided),
                required: U256::from(required),
            }),
            ExecError::SignerMismatch { recovered, expected } => {
                ExecutorError::SignerMismatch(SignerMismatch { recovered, expected })
            }
            // The callee's revert reason is not forwarded.
            ExecError::ActionFailure { index, .. } => ExecutorError::ActionFailure(ActionFailure {
                index: U256::from(index),
            }),
            ExecError::NonceExhausted { signer } => {
                ExecutorError::NonceExhausted(NonceExhausted { signer })
            }
        }
    }
}

impl From<ConfigError> for ExecutorError {
    fn from(_: ConfigError) -> Self {
        ExecutorError::InvalidConfiguration(InvalidConfiguration {})
    }
}
